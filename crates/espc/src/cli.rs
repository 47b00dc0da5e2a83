//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::Parser;

/// ESP (ECMA Server Page) to JavaScript translator.
#[derive(Debug, Parser)]
#[command(name = "espc")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Template files or directories to translate
    #[arg(required = true)]
    pub paths: Vec<Utf8PathBuf>,

    /// Print translated JavaScript to stdout instead of writing files
    #[arg(long)]
    pub stdout: bool,

    /// Statement that binds the `out` writer before the first write
    #[arg(long = "out-init")]
    pub out_init: Option<String>,

    /// Directory to place translated files in (defaults to next to each template)
    #[arg(long = "out-dir")]
    pub out_dir: Option<Utf8PathBuf>,

    /// Path to an espc.json configuration file
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Extension of template files when scanning directories
    #[arg(long)]
    pub extension: Option<String>,

    /// List the files that would be translated, then exit
    #[arg(long = "list-files")]
    pub list_files: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_path() {
        let args = Args::parse_from(["espc", "page.esp"]);
        assert_eq!(args.paths.len(), 1);
        assert_eq!(args.paths[0].as_str(), "page.esp");
        assert!(!args.stdout);
        assert!(args.out_init.is_none());
    }

    #[test]
    fn test_requires_a_path() {
        assert!(Args::try_parse_from(["espc"]).is_err());
    }

    #[test]
    fn test_stdout_and_out_init() {
        let args = Args::parse_from(["espc", "--stdout", "--out-init", "out=getOut();", "a.esp"]);
        assert!(args.stdout);
        assert_eq!(args.out_init.as_deref(), Some("out=getOut();"));
    }

    #[test]
    fn test_out_dir_and_extension() {
        let args = Args::parse_from(["espc", "--out-dir", "build", "--extension", ".ecma", "templates"]);
        assert_eq!(args.out_dir.as_ref().map(|p| p.as_str()), Some("build"));
        assert_eq!(args.extension.as_deref(), Some(".ecma"));
    }

    #[test]
    fn test_list_files() {
        let args = Args::parse_from(["espc", "--list-files", "templates"]);
        assert!(args.list_files);
    }
}
