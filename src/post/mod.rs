pub mod adjust_short_words;
pub mod clean_word_timings;

use crate::error::Result;
use crate::registry::Registry;

/// Register every builtin post-processor, in a fixed order.
pub fn register_all(registry: &mut Registry) -> Result<()> {
    clean_word_timings::register(registry)?;
    adjust_short_words::register(registry)?;
    Ok(())
}
