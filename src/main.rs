//! genotab CLI - filters for tab-delimited genomic data tables
//!
//! # Commands
//!
//! ```bash
//! genotab echo -H genome_id 83333.1 100226.1   # Literal values as a table
//! genotab extract genome_id name -i in.tsv     # Select columns
//! genotab extract -r name -i in.tsv            # All columns except "name"
//! genotab expand subsystems -i in.tsv          # Flatten a :: separated set
//! genotab seqs -i features.tsv                 # Fetch sequences, emit FASTA
//! genotab group /user@patricbrc.org/home/MyGroup   # Emit a group's id list
//! ```
//!
//! Data goes to stdout; status lines go to stderr and can be silenced
//! with `-q`.

use clap::{Parser, Subcommand};
use genotab::error::CliResult;
use genotab::logs::{log_info, log_success, log_warning, LOGGER};
use genotab::table::columns::{all_columns, complement, resolve_many, resolve_one, select};
use genotab::table::couplets::{Couplet, Couplets};
use genotab::table::{join_row, read_header, read_row, wrap_values, Header, Row};
use genotab::{api, expand, fasta, workspace};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "genotab")]
#[command(about = "Filters for tab-delimited genomic data tables", long_about = None)]
struct Cli {
    /// Suppress status messages on stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit literal values as a tab-delimited table
    Echo {
        /// Column name (repeat for each output column)
        #[arg(short = 'H', long = "header", required = true)]
        headers: Vec<String>,

        /// Values, wrapped into rows of one value per column
        values: Vec<String>,

        /// Suppress the header record on output
        #[arg(long)]
        nohead: bool,
    },

    /// Select columns from an input stream
    Extract {
        /// Column references: 1-based position or header name
        #[arg(required_unless_present = "all")]
        columns: Vec<String>,

        /// Input file (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output all columns except the named ones
        #[arg(short, long)]
        reverse: bool,

        /// Output every column (pass-through copy)
        #[arg(short, long)]
        all: bool,

        /// Input stream has no header record
        #[arg(long)]
        nohead: bool,
    },

    /// Expand a delimiter-joined set column into (id, item) rows
    Expand {
        /// Set column reference
        column: String,

        /// Input file (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Separator between set members
        #[arg(short, long, default_value = expand::DEFAULT_DELIMITER)]
        delim: String,

        /// Column supplying the group id (default: auto-incremented)
        #[arg(long, conflicts_with = "id")]
        id_col: Option<String>,

        /// Literal group id applied to every row
        #[arg(long)]
        id: Option<String>,

        /// Input stream has no header record
        #[arg(long)]
        nohead: bool,
    },

    /// Fetch sequences for key-column values and emit FASTA
    Seqs {
        /// Input file (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Key column reference (default: first column)
        #[arg(short = 'c', long = "col")]
        column: Option<String>,

        /// Keys per remote lookup request
        #[arg(short, long, default_value = "100")]
        batch: usize,

        /// Fetch nucleotide sequences instead of protein
        #[arg(long)]
        dna: bool,

        /// Input stream has no header record
        #[arg(long)]
        nohead: bool,
    },

    /// Emit a workspace group's id list as a one-column table
    Group {
        /// Workspace object path of the group
        path: String,

        /// Id field named in the group object
        #[arg(long, default_value = "genome_id")]
        id_field: String,

        /// Suppress the header record on output
        #[arg(long)]
        nohead: bool,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    LOGGER.set_quiet(cli.quiet);

    let result = match cli.command {
        Commands::Echo {
            headers,
            values,
            nohead,
        } => cmd_echo(&headers, &values, nohead),

        Commands::Extract {
            columns,
            input,
            reverse,
            all,
            nohead,
        } => cmd_extract(&columns, input.as_deref(), reverse, all, !nohead),

        Commands::Expand {
            column,
            input,
            delim,
            id_col,
            id,
            nohead,
        } => cmd_expand(
            &column,
            input.as_deref(),
            &delim,
            id_col.as_deref(),
            id.as_deref(),
            !nohead,
        ),

        Commands::Seqs {
            input,
            column,
            batch,
            dna,
            nohead,
        } => cmd_seqs(input.as_deref(), column.as_deref(), batch, dna, !nohead).await,

        Commands::Group {
            path,
            id_field,
            nohead,
        } => cmd_group(&path, &id_field, nohead).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Open the input stream: a file when given, stdin otherwise.
fn open_input(path: Option<&Path>) -> CliResult<Box<dyn BufRead>> {
    match path {
        Some(p) => Ok(Box::new(BufReader::new(File::open(p)?))),
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// Resolve the header before any output side effects.
///
/// For a headered stream this consumes the header record. For a headerless
/// stream the first data row is read to learn the width, names are
/// synthesized, and the row is handed back so it is not lost. `None` means
/// the input held no records at all.
fn prime<R: BufRead>(reader: &mut R, headered: bool) -> CliResult<Option<(Header, Option<Row>)>> {
    if headered {
        Ok(read_header(reader, true)?.map(|header| (header, None)))
    } else {
        match read_row(reader)? {
            Some(row) => {
                let header = Header::synthesize(row.len());
                Ok(Some((header, Some(row))))
            }
            None => Ok(None),
        }
    }
}

fn cmd_echo(headers: &[String], values: &[String], nohead: bool) -> CliResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !nohead {
        writeln!(out, "{}", headers.join("\t"))?;
    }

    let rows = wrap_values(values, headers.len());
    for row in &rows {
        writeln!(out, "{}", join_row(row))?;
    }

    log_success(format!("{} rows written", rows.len()));
    Ok(())
}

fn cmd_extract(
    columns: &[String],
    input: Option<&Path>,
    reverse: bool,
    all: bool,
    headered: bool,
) -> CliResult<()> {
    let mut reader = open_input(input)?;
    let Some((header, pending)) = prime(&mut reader, headered)? else {
        return Ok(());
    };

    let indices = if all {
        all_columns(header.width())
    } else {
        let picked = resolve_many(columns, &header)?;
        if reverse {
            complement(&picked, header.width())
        } else {
            picked
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if headered {
        writeln!(out, "{}", join_row(&select(header.names(), &indices)))?;
    }

    let mut count = 0usize;
    if let Some(row) = pending {
        writeln!(out, "{}", join_row(&select(&row, &indices)))?;
        count += 1;
    }
    while let Some(row) = read_row(&mut reader)? {
        writeln!(out, "{}", join_row(&select(&row, &indices)))?;
        count += 1;
    }

    log_success(format!("{} rows written", count));
    Ok(())
}

fn cmd_expand(
    column: &str,
    input: Option<&Path>,
    delim: &str,
    id_col: Option<&str>,
    id: Option<&str>,
    headered: bool,
) -> CliResult<()> {
    let mut reader = open_input(input)?;
    let Some((header, pending)) = prime(&mut reader, headered)? else {
        return Ok(());
    };

    let set_index = resolve_one(column, &header)?;
    let (id_source, id_name) = match (id_col, id) {
        (Some(raw), _) => {
            let index = resolve_one(raw, &header)?;
            (
                expand::GroupIdSource::Column(index),
                header.names()[index].clone(),
            )
        }
        (None, Some(literal)) => (
            expand::GroupIdSource::Fixed(literal.to_string()),
            "id".to_string(),
        ),
        (None, None) => (expand::GroupIdSource::Auto, "id".to_string()),
    };

    let mut expander = expand::SetExpander::new(delim, id_source);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if headered {
        writeln!(out, "{}\t{}", id_name, header.names()[set_index])?;
    }

    let mut count = 0usize;
    let mut emit = |out: &mut dyn Write, row: &Row, expander: &mut expand::SetExpander| -> CliResult<usize> {
        let entries = expander.expand(row, set_index);
        for entry in &entries {
            writeln!(out, "{}\t{}", entry.group_id, entry.item)?;
        }
        Ok(entries.len())
    };

    if let Some(row) = pending {
        count += emit(&mut out, &row, &mut expander)?;
    }
    while let Some(row) = read_row(&mut reader)? {
        count += emit(&mut out, &row, &mut expander)?;
    }

    log_success(format!("{} set members written", count));
    Ok(())
}

async fn cmd_seqs(
    input: Option<&Path>,
    column: Option<&str>,
    batch: usize,
    dna: bool,
    headered: bool,
) -> CliResult<()> {
    let batch = batch.max(1);
    let mut reader = open_input(input)?;
    let Some((header, pending)) = prime(&mut reader, headered)? else {
        return Ok(());
    };

    // Default key column is the first column.
    let key_index = match column {
        Some(raw) => resolve_one(raw, &header)?,
        None => 0,
    };

    let sequence_field = if dna { "na_sequence" } else { "aa_sequence" };
    let fields: Vec<String> = ["patric_id", "product", sequence_field]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let client = api::DataClient::from_env();
    let mut couplets = Couplets::new(reader, key_index);
    let mut carry: Option<Couplet> = pending.map(|row| Couplet::from_row(row, key_index));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut submitted = 0usize;
    let mut written = 0usize;

    // One chunk of couplets per remote request bounds the working set for
    // arbitrarily large inputs.
    loop {
        let take = if carry.is_some() { batch - 1 } else { batch };
        let mut chunk = couplets.take_chunk(take)?;
        if let Some(couplet) = carry.take() {
            chunk.insert(0, couplet);
        }
        if chunk.is_empty() {
            break;
        }

        let keys: Vec<String> = chunk
            .iter()
            .map(|c| c.key.clone())
            .filter(|k| !k.is_empty())
            .collect();
        submitted += keys.len();

        let tuples = api::fetch_keyed(&client, "genome_feature", &keys, &fields, batch).await?;
        let found = api::index_by_key(tuples);

        // Output follows input order; the response itself is unordered.
        for couplet in &chunk {
            if let Some(tuple) = found.get(&couplet.key) {
                let comment = tuple.get(1).map(String::as_str).unwrap_or("");
                let sequence = tuple.get(2).map(String::as_str).unwrap_or("");
                write!(out, "{}", fasta::format_record(&couplet.key, comment, sequence))?;
                written += 1;
            }
        }
    }

    if written < submitted {
        log_warning(format!("{} keys had no matching sequence", submitted - written));
    }
    log_success(format!("{} sequences written", written));
    Ok(())
}

async fn cmd_group(path: &str, id_field: &str, nohead: bool) -> CliResult<()> {
    let client = workspace::WorkspaceClient::from_env()?;
    log_info(format!("Fetching group object: {}", path));
    let ids = client.id_list(path, id_field).await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !nohead {
        writeln!(out, "{}", id_field)?;
    }
    for id in &ids {
        writeln!(out, "{}", id)?;
    }

    log_success(format!("{} ids written", ids.len()));
    Ok(())
}
