use crate::codegen::PipelineStage;

pub const VALIDATE_TYPE_REFERENCES: &str = "validateTypeReferences";

/// Fails when any local type name is used without being defined
pub fn validate_type_references() -> PipelineStage {
    PipelineStage::new(
        VALIDATE_TYPE_REFERENCES,
        "Checks that every referenced type is defined",
        |types| {
            types.validate_references()?;
            Ok(types)
        },
    )
}
