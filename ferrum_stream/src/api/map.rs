use crate::api::record::Renderable;
use crate::core::context::Context;

/// Mapper transforms one input record into zero or more emitted records.
///
/// `map` is called exactly once per input line, in input order. It declares
/// no failure: per-record problems (a missing file, an unsupported format)
/// are business logic and should be counted through the context, not
/// propagated. A panic inside `map` is fatal to the whole run.
pub trait Mapper {
    type KeyOut: Renderable;
    type ValueOut: Renderable;

    fn map(&mut self, key: &str, value: &str, ctx: &mut Context<'_, Self::KeyOut, Self::ValueOut>);
}
