pub mod words_json;

use crate::error::Result;
use crate::registry::Registry;

/// Register every builtin transcriber, in a fixed order.
pub fn register_all(registry: &mut Registry) -> Result<()> {
    words_json::register(registry)?;
    Ok(())
}
