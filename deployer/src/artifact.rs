//! Compiled contract artifacts.

use std::{
    collections::HashMap,
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use alloy::{json_abi::JsonAbi, primitives::Bytes};
use eyre::{bail, WrapErr};
use serde::Deserialize;

/// A compiled contract: deployable bytecode plus interface descriptor,
/// produced by a separate build step and read-only thereafter.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Name of the contract.
    pub contract_name: String,
    /// Source file the contract was compiled from.
    #[serde(default)]
    pub source_name: String,
    /// The contract's ABI.
    pub abi: JsonAbi,
    /// Deployable bytecode.
    pub bytecode: Bytes,
    /// Digests of contracts this one instantiates at runtime, keyed by the
    /// qualified name the compiler recorded.
    #[serde(default)]
    pub factory_deps: HashMap<String, String>,
}

/// Resolves artifacts by contract name from a build-output directory.
#[derive(Clone, Debug)]
pub struct ArtifactResolver {
    artifacts_dir: PathBuf,
}

impl ArtifactResolver {
    /// Create a resolver rooted at `artifacts_dir`.
    pub fn new(artifacts_dir: impl Into<PathBuf>) -> Self {
        Self { artifacts_dir: artifacts_dir.into() }
    }

    /// Load the artifact for the contract named `name`.
    ///
    /// The build output nests artifacts under per-source directories, so
    /// the resolver searches recursively for `<name>.json`. Debug
    /// companions (`<name>.dbg.json`) never match.
    ///
    /// # Errors
    ///
    /// Fails if no matching artifact exists, if the file cannot be parsed,
    /// or if the file names a different contract than requested.
    pub fn load(&self, name: &str) -> eyre::Result<Artifact> {
        let file_name = format!("{name}.json");
        let Some(path) = find_file(&self.artifacts_dir, &file_name)? else {
            bail!(
                "no artifact for contract `{name}` under {}; was it compiled?",
                self.artifacts_dir.display()
            );
        };

        let raw = fs::read_to_string(&path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let artifact: Artifact = serde_json::from_str(&raw)
            .wrap_err_with(|| format!("failed to parse {}", path.display()))?;

        if artifact.contract_name != name {
            bail!(
                "artifact at {} names contract `{}`, expected `{name}`",
                path.display(),
                artifact.contract_name
            );
        }

        Ok(artifact)
    }
}

/// Recursively look for `file_name` under `dir`. First match wins.
fn find_file(dir: &Path, file_name: &str) -> eyre::Result<Option<PathBuf>> {
    let entries = fs::read_dir(dir)
        .wrap_err_with(|| format!("failed to read {}", dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            if let Some(found) = find_file(&path, file_name)? {
                return Ok(Some(found));
            }
        } else if path.file_name() == Some(OsStr::new(file_name)) {
            return Ok(Some(path));
        }
    }

    Ok(None)
}
