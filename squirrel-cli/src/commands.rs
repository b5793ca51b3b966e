//! CLI command implementations

use std::path::PathBuf;

use clap::Subcommand;
use squirrel_core::config::{PlacementMethod, SquirrelConfig};
use squirrel_core::{
    CompositeReactor, FileReactor, Manifest, Reactor, Result, SquirrelError, SubTrie,
    TracingReactor,
};
use tracing::Level;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Mirror a manifest into a directory hierarchy
    Mirror {
        /// Path to the JSON manifest
        manifest: PathBuf,
        /// Root of the hierarchy (overrides SQUIRREL_ROOT_DIR)
        #[arg(long)]
        root: Option<PathBuf>,
        /// Directory files are taken from (overrides SQUIRREL_POOL_DIR)
        #[arg(long)]
        pool: Option<PathBuf>,
        /// How files are put in place (overrides SQUIRREL_METHOD)
        #[arg(long, value_enum)]
        method: Option<PlacementMethod>,
        /// Regex for file names left alone on cleanup (overrides SQUIRREL_IGNORE)
        #[arg(long)]
        ignore: Option<String>,
    },
    /// Print the trie built from a manifest
    Show {
        /// Path to the JSON manifest
        manifest: PathBuf,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Mirror {
            manifest,
            root,
            pool,
            method,
            ignore,
        } => {
            let config = resolve_mirror_config(root, pool, method, ignore)?;
            mirror_manifest(&manifest, &config)
        }
        Commands::Show { manifest } => show_manifest(&manifest),
    }
}

/// Environment configuration with the given flags applied on top
///
/// # Errors
/// - `SquirrelError::Configuration` - Neither `--root` nor `SQUIRREL_ROOT_DIR` given
pub fn resolve_mirror_config(
    root: Option<PathBuf>,
    pool: Option<PathBuf>,
    method: Option<PlacementMethod>,
    ignore: Option<String>,
) -> Result<SquirrelConfig> {
    let mut config = SquirrelConfig::from_env();
    match root {
        Some(root) => config.mirror.root_dir = root,
        None if std::env::var_os("SQUIRREL_ROOT_DIR").is_none() => {
            return Err(SquirrelError::Configuration {
                reason: "no mirror root given, pass --root or set SQUIRREL_ROOT_DIR".to_string(),
            });
        }
        None => {}
    }
    if let Some(pool) = pool {
        config.mirror.pool_dir = pool;
    }
    if let Some(method) = method {
        config.mirror.method = method;
    }
    if ignore.is_some() {
        config.mirror.ignore_pattern = ignore;
    }
    Ok(config)
}

/// Mirror every manifest entry into the configured root
///
/// # Errors
/// - `SquirrelError::Reactor` - Root or pool invalid, or the hierarchy could not be updated
/// - `SquirrelError::Manifest` - Manifest could not be parsed
/// - `SquirrelError::Io` - Manifest could not be read
pub fn mirror_manifest(manifest_path: &std::path::Path, config: &SquirrelConfig) -> Result<()> {
    let manifest = Manifest::load(manifest_path)?;
    let file_reactor = FileReactor::new(&config.mirror)?;

    let reactors: Vec<Box<dyn Reactor<Vec<String>>>> = vec![
        Box::new(file_reactor),
        Box::new(TracingReactor::new(Level::DEBUG)),
    ];
    let trie = manifest.build_trie(CompositeReactor::new(reactors))?;

    tracing::info!(
        keys = trie.len(),
        nodes = trie.node_count(),
        root = %config.mirror.root_dir.display(),
        "Mirror complete"
    );
    println!(
        "Mirrored {} keys into {} ({} directories)",
        trie.len(),
        config.mirror.root_dir.display(),
        trie.node_count() - 1
    );

    Ok(())
}

/// Print the trie layout of a manifest
///
/// # Errors
/// - `SquirrelError::Manifest` - Manifest could not be parsed
/// - `SquirrelError::Io` - Manifest could not be read
pub fn show_manifest(manifest_path: &std::path::Path) -> Result<()> {
    let manifest = Manifest::load(manifest_path)?;
    let trie = manifest.build_trie(squirrel_core::EmptyReactor)?;

    print!("{}", render_tree(trie.root()));
    println!("{:-<60}", "");
    println!("{} keys, {} nodes", trie.len(), trie.node_count());

    Ok(())
}

/// Render a subtree as an indented outline, one node per line.
pub fn render_tree(node: SubTrie<'_, Vec<String>>) -> String {
    let mut out = String::new();
    render_node(&node, 0, &mut out);
    out
}

fn render_node(node: &SubTrie<'_, Vec<String>>, depth: usize, out: &mut String) {
    let label = if depth == 0 { "(root)" } else { node.suffix() };
    out.push_str(&" ".repeat(depth * 2));
    out.push_str(label);
    if let Some(files) = node.value() {
        out.push_str(" [");
        out.push_str(&files.join(", "));
        out.push(']');
    }
    out.push('\n');

    for child in node.children() {
        render_node(&child, depth + 1, out);
    }
}
