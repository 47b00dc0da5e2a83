//! File discovery and translation driving.

use crate::cli::Args;
use crate::config::{ConfigError, EspcConfig};
use camino::{Utf8Path, Utf8PathBuf};
use esp_reader::{translate_with_options, StringReader, TranslateOptions};
use rayon::prelude::*;
use std::fs;
use thiserror::Error;
use walkdir::WalkDir;

/// Extension of template files when neither flag nor config names one.
const DEFAULT_TEMPLATE_EXTENSION: &str = ".esp";

/// Extension of translated files when the config does not name one.
const DEFAULT_OUTPUT_EXTENSION: &str = ".js";

/// An error produced while running the translator.
#[derive(Debug, Error)]
pub enum EspcError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A named input does not exist.
    #[error("input not found: {0}")]
    MissingInput(Utf8PathBuf),

    /// Scanning a directory failed.
    #[error("directory scan failed: {0}")]
    Scan(#[from] walkdir::Error),

    /// A discovered path was not valid UTF-8.
    #[error("path is not valid utf-8: {0}")]
    NonUtf8Path(std::path::PathBuf),

    /// A template could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path of the template.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A translated file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Path of the output file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Nothing matched the given paths.
    #[error("no template files found")]
    NoTemplates,
}

/// What a run accomplished.
#[derive(Debug)]
pub struct Summary {
    /// Number of templates translated.
    pub translated: usize,
}

/// Runs a full translation pass over the paths named in `args`.
pub fn run(args: Args) -> Result<Summary, EspcError> {
    let config = resolve_config(&args)?;
    let out_init = args
        .out_init
        .clone()
        .or_else(|| config.out_init_statement.clone());
    let extension = args
        .extension
        .clone()
        .or_else(|| config.extension.clone())
        .unwrap_or_else(|| DEFAULT_TEMPLATE_EXTENSION.to_string());
    let output_extension = config
        .output_extension
        .clone()
        .unwrap_or_else(|| DEFAULT_OUTPUT_EXTENSION.to_string());

    let files = discover(&args.paths, &extension)?;
    if files.is_empty() {
        return Err(EspcError::NoTemplates);
    }

    if args.list_files {
        for file in &files {
            println!("{file}");
        }
        return Ok(Summary { translated: 0 });
    }

    if args.stdout {
        // Sequential so multi-file output stays in input order.
        for file in &files {
            let js = translate_file(file, out_init.as_deref())?;
            print!("{js}");
        }
        return Ok(Summary {
            translated: files.len(),
        });
    }

    files
        .par_iter()
        .try_for_each(|file| {
            let js = translate_file(file, out_init.as_deref())?;
            let target = output_path(file, args.out_dir.as_deref(), &output_extension);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|source| EspcError::Write {
                    path: target.clone(),
                    source,
                })?;
            }
            fs::write(&target, js).map_err(|source| EspcError::Write {
                path: target.clone(),
                source,
            })
        })?;

    println!("Translated {} template(s)", files.len());
    Ok(Summary {
        translated: files.len(),
    })
}

/// Loads config named by `--config`, or `espc.json` from the working
/// directory, or defaults.
fn resolve_config(args: &Args) -> Result<EspcConfig, EspcError> {
    if let Some(path) = &args.config {
        return Ok(EspcConfig::load(path)?);
    }
    match EspcConfig::find(Utf8Path::new("."))? {
        Some((_, config)) => Ok(config),
        None => Ok(EspcConfig::default()),
    }
}

/// Expands the given paths into the sorted list of template files.
///
/// Directories are walked recursively and filtered by `extension`; files
/// named directly are taken as-is.
fn discover(paths: &[Utf8PathBuf], extension: &str) -> Result<Vec<Utf8PathBuf>, EspcError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path) {
                let entry = entry?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let entry_path = Utf8PathBuf::from_path_buf(entry.into_path())
                    .map_err(EspcError::NonUtf8Path)?;
                if entry_path.as_str().ends_with(extension) {
                    files.push(entry_path);
                }
            }
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(EspcError::MissingInput(path.clone()));
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn translate_file(path: &Utf8Path, out_init: Option<&str>) -> Result<String, EspcError> {
    let source = fs::read_to_string(path).map_err(|source| EspcError::Read {
        path: path.to_owned(),
        source,
    })?;
    let options = TranslateOptions {
        out_init: out_init.map(str::to_string),
    };
    translate_with_options(StringReader::new(&source), options).map_err(|source| {
        EspcError::Read {
            path: path.to_owned(),
            source,
        }
    })
}

/// Where the translated JavaScript for `file` lands.
fn output_path(file: &Utf8Path, out_dir: Option<&Utf8Path>, output_extension: &str) -> Utf8PathBuf {
    let target = file.with_extension(output_extension.trim_start_matches('.'));
    match out_dir {
        Some(dir) => dir.join(target.file_name().unwrap_or(target.as_str())),
        None => target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_sibling() {
        let path = output_path(Utf8Path::new("templates/page.esp"), None, ".js");
        assert_eq!(path.as_str(), "templates/page.js");
    }

    #[test]
    fn test_output_path_into_out_dir() {
        let path = output_path(
            Utf8Path::new("templates/page.esp"),
            Some(Utf8Path::new("build")),
            ".js",
        );
        assert_eq!(path.as_str(), "build/page.js");
    }

    #[test]
    fn test_output_path_custom_extension() {
        let path = output_path(Utf8Path::new("page.esp"), None, "mjs");
        assert_eq!(path.as_str(), "page.mjs");
    }

    #[test]
    fn test_discover_missing_input() {
        let result = discover(&[Utf8PathBuf::from("does-not-exist.esp")], ".esp");
        assert!(matches!(result, Err(EspcError::MissingInput(_))));
    }
}
