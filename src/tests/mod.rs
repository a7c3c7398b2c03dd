#[path = "../../tests/common/logs.rs"]
mod logs;
pub(crate) mod test_support;
