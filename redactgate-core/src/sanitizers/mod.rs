//! Rule compilation for the pattern scanner.
//!
//! `compiler` converts declarative `DetectionRule`s into `CompiledRule`s: regexes are
//! built, validator ids resolved against the registry, and replacement templates
//! normalized. The output is an immutable `RuleSnapshot` that the scanner reads without
//! further allocation or lookup.

pub mod compiler;
