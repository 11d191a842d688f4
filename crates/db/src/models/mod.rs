//! Row structs and DTOs.
//!
//! Each submodule holds a `FromRow` entity matching the table and, where
//! the table is written to, the DTO used for inserts.

pub mod level;
pub mod question;
pub mod quiz_result;
pub mod setting;
