use serde_derive::{Deserialize, Serialize};
use std::path::Path;
use wire_types::{Constant, Context, File, Struct};

/* On-disk format description document */
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct WireFile {
    /* Optional human-readable package name, used for diagnostics only */
    #[serde(default)]
    pub package: Option<String>,

    /* Other documents this one depends on, relative to this file or an include dir */
    #[serde(default)]
    pub imports: Vec<String>,

    /* Named integer constants */
    #[serde(default)]
    pub constants: Vec<Constant>,

    /* Shared parsing contexts */
    #[serde(default)]
    pub contexts: Vec<Context>,

    /* Structure declarations */
    #[serde(default)]
    pub structs: Vec<Struct>,
}

impl WireFile {
    /* Parse a document from YAML text */
    pub fn from_yaml(contents: &str) -> anyhow::Result<Self> {
        Ok(serde_yml::from_str(contents)?)
    }

    /* Get the imports */
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /* Get the package name, falling back to the given default */
    pub fn package_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.package.as_deref().unwrap_or(default)
    }

    /* Convert into the AST file, naming it after the package or the source path */
    pub fn into_file(self, path: &Path) -> File {
        let name = match self.package {
            Some(package) => package,
            None => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        File {
            name,
            constants: self.constants,
            contexts: self.contexts,
            structs: self.structs,
        }
    }
}
