use askama::Result;

use crate::money;

// Custom filter to render cents as Brazilian currency.
// This allows us to use `|brl` in the templates.
#[allow(clippy::unnecessary_wraps)]
pub fn brl(cents: &i64) -> Result<String> {
    Ok(money::format_brl(*cents))
}
