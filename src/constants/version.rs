use semver::Version;

/// vergen writes this in place of the sha when git information isn't available.
const IDEMPOTENT_SHA: &str = "VERGEN_IDEMPOTENT_OUTPUT";

pub fn get_version() -> String {
    format_version(env!("CARGO_PKG_VERSION"), env!("VERGEN_GIT_SHA"))
}

fn format_version(pkg_version: &str, sha: &str) -> String {
    let Ok(semver) = pkg_version.parse::<Version>() else {
        tracing::warn!("couldn't parse a semver out of Cargo.toml? defaulting to 0.0.0-unknown.");
        return String::from("0.0.0-unknown");
    };

    if sha.is_empty() || sha == IDEMPOTENT_SHA || sha == "unknown" {
        format!("{}", semver)
    } else {
        format!("{} (`{}`)", semver, &sha[..sha.len().min(7)])
    }
}
