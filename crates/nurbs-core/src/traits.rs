use crate::error::Result;

/// Validate structural integrity of a spline or derived entity.
///
/// This is an explicit, comprehensive, opt-in pass; evaluation routines do
/// not run it implicitly, so hot loops can skip redundant validation once
/// an entity is known-good.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}
