#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Employee = 0,
    Approver = 1,
    HrAdmin = 2,
    SuperAdmin = 3,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Role::Employee),
            1 => Some(Role::Approver),
            2 => Some(Role::HrAdmin),
            3 => Some(Role::SuperAdmin),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Roles allowed to decide on leave requests.
    pub fn can_approve(self) -> bool {
        matches!(self, Role::Approver | Role::HrAdmin | Role::SuperAdmin)
    }

    pub fn is_hr(self) -> bool {
        matches!(self, Role::HrAdmin | Role::SuperAdmin)
    }
}
