use anyhow::Result;
use vergen::EmitBuilder;

// Stamps VERGEN_GIT_SHA for `udl_kml --version`
fn main() -> Result<()> {
    EmitBuilder::builder().git_sha(true).emit()?;
    Ok(())
}
