use anyhow::Error;
use vergen_gitcl::{Emitter, GitclBuilder};

pub fn main() -> Result<(), Error> {
    println!("cargo:rerun-if-changed=migrations");
    println!("cargo:rerun-if-env-changed=VERGEN_GIT_SHA");

    if let Ok(sha) = std::env::var("VERGEN_GIT_SHA") {
        if !sha.is_empty() && sha != "unknown" {
            println!("cargo:rustc-env=VERGEN_GIT_SHA={sha}");

            return Ok(());
        }
    }

    let gitcl = GitclBuilder::default().sha(true).build()?;

    // builds from a source tarball have no git metadata to read.
    if Emitter::default().add_instructions(&gitcl)?.emit().is_err() {
        println!("cargo:rustc-env=VERGEN_GIT_SHA=unknown");
    }

    Ok(())
}
