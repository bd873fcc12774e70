//! Business record kinds served by the API and CLI.
//!
//! Each kind implements [`Record`] (field access by name for the query
//! engine) and [`Entity`] (kind key + default search fields). Field sets
//! mirror what the list screens actually show; detail-form-only fields
//! live with the forms, not here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Entity, FieldValue, Record, Uid};

/// All kind keys, in the order the admin console lists them.
pub const KINDS: &[&str] = &[
    Vendor::KIND,
    Component::KIND,
    DiePlan::KIND,
    SparePartRequest::KIND,
    HsrpRequest::KIND,
    RsaRequest::KIND,
    User::KIND,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    #[serde(default)]
    pub uid: Uid,
    pub name: String,
    pub city: String,
    pub category: String,
    pub status: String,
    #[serde(default)]
    pub gst_no: Option<String>,
    pub rating: f64,
    pub onboarded_on: NaiveDate,
}

impl Record for Vendor {
    fn uid(&self) -> Uid {
        self.uid
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "name" => Some(FieldValue::Str(&self.name)),
            "city" => Some(FieldValue::Str(&self.city)),
            "category" => Some(FieldValue::Str(&self.category)),
            "status" => Some(FieldValue::Str(&self.status)),
            "gst_no" => self.gst_no.as_deref().map(FieldValue::Str),
            "rating" => Some(FieldValue::Num(self.rating)),
            "onboarded_on" => Some(FieldValue::Date(self.onboarded_on)),
            _ => None,
        }
    }
}

impl Entity for Vendor {
    const KIND: &'static str = "vendors";

    fn search_fields() -> &'static [&'static str] {
        &["name", "city", "category"]
    }

    fn set_uid(&mut self, uid: Uid) {
        self.uid = uid;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub uid: Uid,
    pub part_no: String,
    pub name: String,
    pub category: String,
    pub status: String,
    pub unit_cost: f64,
    pub stock: i64,
}

impl Record for Component {
    fn uid(&self) -> Uid {
        self.uid
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "part_no" => Some(FieldValue::Str(&self.part_no)),
            "name" => Some(FieldValue::Str(&self.name)),
            "category" => Some(FieldValue::Str(&self.category)),
            "status" => Some(FieldValue::Str(&self.status)),
            "unit_cost" => Some(FieldValue::Num(self.unit_cost)),
            "stock" => Some(FieldValue::Num(self.stock as f64)),
            _ => None,
        }
    }
}

impl Entity for Component {
    const KIND: &'static str = "components";

    fn search_fields() -> &'static [&'static str] {
        &["part_no", "name", "category"]
    }

    fn set_uid(&mut self, uid: Uid) {
        self.uid = uid;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiePlan {
    #[serde(default)]
    pub uid: Uid,
    pub die_no: String,
    pub part_name: String,
    pub vendor: String,
    pub status: String,
    pub target_date: NaiveDate,
    #[serde(default)]
    pub actual_date: Option<NaiveDate>,
}

impl Record for DiePlan {
    fn uid(&self) -> Uid {
        self.uid
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "die_no" => Some(FieldValue::Str(&self.die_no)),
            "part_name" => Some(FieldValue::Str(&self.part_name)),
            "vendor" => Some(FieldValue::Str(&self.vendor)),
            "status" => Some(FieldValue::Str(&self.status)),
            "target_date" => Some(FieldValue::Date(self.target_date)),
            "actual_date" => self.actual_date.map(FieldValue::Date),
            _ => None,
        }
    }
}

impl Entity for DiePlan {
    const KIND: &'static str = "die-plans";

    fn search_fields() -> &'static [&'static str] {
        &["die_no", "part_name", "vendor"]
    }

    fn set_uid(&mut self, uid: Uid) {
        self.uid = uid;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparePartRequest {
    #[serde(default)]
    pub uid: Uid,
    pub request_no: String,
    pub part_name: String,
    pub dealer: String,
    pub quantity: i64,
    pub status: String,
    pub raised_on: NaiveDate,
}

impl Record for SparePartRequest {
    fn uid(&self) -> Uid {
        self.uid
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "request_no" => Some(FieldValue::Str(&self.request_no)),
            "part_name" => Some(FieldValue::Str(&self.part_name)),
            "dealer" => Some(FieldValue::Str(&self.dealer)),
            "quantity" => Some(FieldValue::Num(self.quantity as f64)),
            "status" => Some(FieldValue::Str(&self.status)),
            "raised_on" => Some(FieldValue::Date(self.raised_on)),
            _ => None,
        }
    }
}

impl Entity for SparePartRequest {
    const KIND: &'static str = "spare-part-requests";

    fn search_fields() -> &'static [&'static str] {
        &["request_no", "part_name", "dealer"]
    }

    fn set_uid(&mut self, uid: Uid) {
        self.uid = uid;
    }
}

/// HSRP: high-security registration plate request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HsrpRequest {
    #[serde(default)]
    pub uid: Uid,
    pub request_no: String,
    pub chassis_no: String,
    pub dealer: String,
    pub state: String,
    pub status: String,
    pub raised_on: NaiveDate,
}

impl Record for HsrpRequest {
    fn uid(&self) -> Uid {
        self.uid
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "request_no" => Some(FieldValue::Str(&self.request_no)),
            "chassis_no" => Some(FieldValue::Str(&self.chassis_no)),
            "dealer" => Some(FieldValue::Str(&self.dealer)),
            "state" => Some(FieldValue::Str(&self.state)),
            "status" => Some(FieldValue::Str(&self.status)),
            "raised_on" => Some(FieldValue::Date(self.raised_on)),
            _ => None,
        }
    }
}

impl Entity for HsrpRequest {
    const KIND: &'static str = "hsrp-requests";

    fn search_fields() -> &'static [&'static str] {
        &["request_no", "chassis_no", "dealer"]
    }

    fn set_uid(&mut self, uid: Uid) {
        self.uid = uid;
    }
}

/// RSA: roadside assistance request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsaRequest {
    #[serde(default)]
    pub uid: Uid,
    pub request_no: String,
    pub customer_name: String,
    pub registration_no: String,
    pub plan: String,
    pub status: String,
    pub raised_on: NaiveDate,
}

impl Record for RsaRequest {
    fn uid(&self) -> Uid {
        self.uid
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "request_no" => Some(FieldValue::Str(&self.request_no)),
            "customer_name" => Some(FieldValue::Str(&self.customer_name)),
            "registration_no" => Some(FieldValue::Str(&self.registration_no)),
            "plan" => Some(FieldValue::Str(&self.plan)),
            "status" => Some(FieldValue::Str(&self.status)),
            "raised_on" => Some(FieldValue::Date(self.raised_on)),
            _ => None,
        }
    }
}

impl Entity for RsaRequest {
    const KIND: &'static str = "rsa-requests";

    fn search_fields() -> &'static [&'static str] {
        &["request_no", "customer_name", "registration_no"]
    }

    fn set_uid(&mut self, uid: Uid) {
        self.uid = uid;
    }
}

/// Admin-console login, listed on the user management screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub uid: Uid,
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub email: String,
    pub status: String,
}

impl Record for User {
    fn uid(&self) -> Uid {
        self.uid
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "username" => Some(FieldValue::Str(&self.username)),
            "full_name" => Some(FieldValue::Str(&self.full_name)),
            "role" => Some(FieldValue::Str(&self.role)),
            "email" => Some(FieldValue::Str(&self.email)),
            "status" => Some(FieldValue::Str(&self.status)),
            _ => None,
        }
    }
}

impl Entity for User {
    const KIND: &'static str = "users";

    fn search_fields() -> &'static [&'static str] {
        &["username", "full_name", "email"]
    }

    fn set_uid(&mut self, uid: Uid) {
        self.uid = uid;
    }
}
