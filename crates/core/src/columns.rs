//! Built-in table columns per record kind.
//!
//! Column sets drive the CLI's human output (and any future table UI):
//! a label, the record field to render, and a width hint.

use crate::entities::{
    Component, DiePlan, HsrpRequest, RsaRequest, SparePartRequest, User, Vendor,
};
use crate::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub field: &'static str,
    pub label: &'static str,
    pub width: usize,
}

const fn col(field: &'static str, label: &'static str, width: usize) -> ColumnSpec {
    ColumnSpec { field, label, width }
}

const VENDOR_COLS: &[ColumnSpec] = &[
    col("name", "Name", 28),
    col("city", "City", 14),
    col("category", "Category", 14),
    col("status", "Status", 10),
    col("rating", "Rating", 7),
    col("onboarded_on", "Onboarded", 11),
];

const COMPONENT_COLS: &[ColumnSpec] = &[
    col("part_no", "Part No", 12),
    col("name", "Name", 28),
    col("category", "Category", 14),
    col("status", "Status", 10),
    col("unit_cost", "Unit Cost", 10),
    col("stock", "Stock", 7),
];

const DIE_PLAN_COLS: &[ColumnSpec] = &[
    col("die_no", "Die No", 10),
    col("part_name", "Part", 24),
    col("vendor", "Vendor", 22),
    col("status", "Status", 12),
    col("target_date", "Target", 11),
    col("actual_date", "Actual", 11),
];

const SPARE_PART_COLS: &[ColumnSpec] = &[
    col("request_no", "Request", 12),
    col("part_name", "Part", 24),
    col("dealer", "Dealer", 20),
    col("quantity", "Qty", 5),
    col("status", "Status", 12),
    col("raised_on", "Raised", 11),
];

const HSRP_COLS: &[ColumnSpec] = &[
    col("request_no", "Request", 12),
    col("chassis_no", "Chassis", 18),
    col("dealer", "Dealer", 20),
    col("state", "State", 14),
    col("status", "Status", 12),
    col("raised_on", "Raised", 11),
];

const RSA_COLS: &[ColumnSpec] = &[
    col("request_no", "Request", 12),
    col("customer_name", "Customer", 22),
    col("registration_no", "Reg No", 14),
    col("plan", "Plan", 10),
    col("status", "Status", 12),
    col("raised_on", "Raised", 11),
];

const USER_COLS: &[ColumnSpec] = &[
    col("username", "Username", 16),
    col("full_name", "Full Name", 24),
    col("role", "Role", 12),
    col("email", "Email", 26),
    col("status", "Status", 10),
];

/// Column set for a kind key. Unknown kinds get an empty set; the caller
/// falls back to uid-only output.
pub fn columns_for(kind: &str) -> &'static [ColumnSpec] {
    match kind {
        k if k == Vendor::KIND => VENDOR_COLS,
        k if k == Component::KIND => COMPONENT_COLS,
        k if k == DiePlan::KIND => DIE_PLAN_COLS,
        k if k == SparePartRequest::KIND => SPARE_PART_COLS,
        k if k == HsrpRequest::KIND => HSRP_COLS,
        k if k == RsaRequest::KIND => RSA_COLS,
        k if k == User::KIND => USER_COLS,
        _ => &[],
    }
}
