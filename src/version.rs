use std::sync::LazyLock;

include!(concat!(env!("OUT_DIR"), "/built.rs"));

/// Full version string: the crate version, plus the git commit it was built
/// from and a `-dirty` marker when the working tree had local changes.
pub static VERSION: LazyLock<String> = LazyLock::new(|| {
    let mut version = match GIT_COMMIT_HASH {
        Some(commit) => format!("{PKG_VERSION}-{commit}"),
        None => PKG_VERSION.to_string(),
    };
    if GIT_DIRTY == Some(true) {
        version.push_str("-dirty");
    }
    version
});
