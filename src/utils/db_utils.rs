use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::MySqlPool;

use crate::error::LeaveError;
use crate::model::tenant::TenantId;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, PartialEq)]
pub enum SqlValue {
    String(String),
    I64(i64),
    U64(u64),
    Decimal(Decimal),
    Bool(bool),
    Null,
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build a tenant-scoped partial UPDATE
/// ===============================
///
/// Only keys listed in `allowed` may appear in `payload`; anything else is
/// a validation error so that column names never come from the client.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    allowed: &[&str],
    tenant: TenantId,
    key_column: &str,
    key: SqlValue,
) -> Result<SqlUpdate, LeaveError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| LeaveError::validation("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(LeaveError::validation("No fields provided for update"));
    }

    if let Some(unknown) = obj.keys().find(|k| !allowed.contains(&k.as_str())) {
        return Err(LeaveError::Validation(format!(
            "Field '{unknown}' cannot be updated"
        )));
    }

    // Build SET clause
    let set_clause = obj
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "UPDATE {} SET {} WHERE tenant_id = ? AND {} = ?",
        table, set_clause, key_column
    );

    let mut values = Vec::with_capacity(obj.len() + 2);

    // Convert JSON values → SqlValue
    for (column, value) in obj {
        match value {
            Value::String(s) => values.push(SqlValue::String(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    values.push(SqlValue::I64(i));
                } else {
                    let d = n.to_string().parse::<Decimal>().map_err(|_| {
                        LeaveError::Validation(format!("Field '{column}' is not a valid number"))
                    })?;
                    values.push(SqlValue::Decimal(d));
                }
            }
            Value::Bool(b) => values.push(SqlValue::Bool(*b)),
            Value::Null => values.push(SqlValue::Null),
            _ => {
                return Err(LeaveError::Validation(format!(
                    "Field '{column}' has an unsupported value type"
                )));
            }
        }
    }

    values.push(SqlValue::U64(tenant.get()));
    values.push(key);

    Ok(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::Decimal(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALLOWED: &[&str] = &["daily_working_hours", "country_code", "working_days"];

    #[test]
    fn builds_tenant_scoped_update() {
        let payload = json!({ "country_code": "GB", "working_days": 31 });

        let update = build_update_sql(
            "employees",
            &payload,
            ALLOWED,
            TenantId(4),
            "id",
            SqlValue::U64(9),
        )
        .unwrap();

        assert_eq!(
            update.sql,
            "UPDATE employees SET country_code = ?, working_days = ? WHERE tenant_id = ? AND id = ?"
        );
        assert_eq!(
            update.values,
            vec![
                SqlValue::String("GB".into()),
                SqlValue::I64(31),
                SqlValue::U64(4),
                SqlValue::U64(9),
            ]
        );
    }

    #[test]
    fn fractional_numbers_become_decimals() {
        let payload = json!({ "daily_working_hours": 7.5 });
        let update =
            build_update_sql("employees", &payload, ALLOWED, TenantId(1), "id", SqlValue::U64(1))
                .unwrap();
        assert_eq!(update.values[0], SqlValue::Decimal(Decimal::new(75, 1)));
    }

    #[test]
    fn rejects_unknown_columns_and_empty_payloads() {
        let err = build_update_sql(
            "employees",
            &json!({ "role_id": 3 }),
            ALLOWED,
            TenantId(1),
            "id",
            SqlValue::U64(1),
        )
        .unwrap_err();
        assert!(matches!(err, LeaveError::Validation(_)));

        assert!(
            build_update_sql("employees", &json!({}), ALLOWED, TenantId(1), "id", SqlValue::U64(1))
                .is_err()
        );
    }
}
