use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Customer partition every row belongs to. Passed explicitly to each core call.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TenantId(pub u64);

impl TenantId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl sqlx::Type<sqlx::MySql> for TenantId {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <u64 as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <u64 as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for TenantId {
    fn encode_by_ref(&self, buf: &mut Vec<u8>) -> sqlx::encode::IsNull {
        <u64 as sqlx::Encode<'q, sqlx::MySql>>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for TenantId {
    fn decode(value: sqlx::mysql::MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        Ok(TenantId(<u64 as sqlx::Decode<'r, sqlx::MySql>>::decode(value)?))
    }
}
