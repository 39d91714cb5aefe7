use easyscore::options::{parse_key, parse_rehearsal_mode};
use easyscore::{simplify_musicxml, FingeringStyle, ScoreError, TransformOptions, TransformReport};
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: easyscore --instrument ID [flags] <input.musicxml> <output.musicxml>

Flags:
  --instrument ID           bb_trumpet, bb_clarinet, f_horn, eb_alto_sax, flute, concert_pitch
  --source-key KEY          concert key of the source (Bb, Gm, ##, ...)
  --config FILE             YAML options file; flags below override it
  --no-rhythm               keep eighth-note figures
  --no-range                keep octaves
  --no-instrument           keep instrument metadata and key
  --fingerings              annotate pitches beginners have not learned
  --fingering-style STYLE   numbers, holes or both
  --courtesy-accidentals    add cautionary accidentals
  --courtesy-fingerings     annotate every note showing an accidental
  --rename-parts            use the instrument's part name
  --rehearsal MODE          measure-numbers (default), letters or none
  --split-multimeasure-rests
                            print multi-measure rests one measure at a time
  --no-mark                 leave the software credit and part name metadata alone";

struct Args {
    instrument: String,
    input: String,
    output: String,
    config: Option<String>,
    flags: Vec<Flag>,
}

/// Flags applied on top of the config file, in command-line order.
enum Flag {
    SourceKey(String),
    NoRhythm,
    NoRange,
    NoInstrument,
    Fingerings,
    FingeringStyle(String),
    CourtesyAccidentals,
    CourtesyFingerings,
    RenameParts,
    Rehearsal(String),
    SplitMultimeasureRests,
    NoMark,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut instrument = None;
    let mut config = None;
    let mut flags = Vec::new();
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{} needs a value", name))
        };
        match arg.as_str() {
            "--instrument" => instrument = Some(value("--instrument")?),
            "--source-key" => flags.push(Flag::SourceKey(value("--source-key")?)),
            "--config" => config = Some(value("--config")?),
            "--fingering-style" => flags.push(Flag::FingeringStyle(value("--fingering-style")?)),
            "--no-rhythm" => flags.push(Flag::NoRhythm),
            "--no-range" => flags.push(Flag::NoRange),
            "--no-instrument" => flags.push(Flag::NoInstrument),
            "--fingerings" => flags.push(Flag::Fingerings),
            "--courtesy-accidentals" => flags.push(Flag::CourtesyAccidentals),
            "--courtesy-fingerings" => flags.push(Flag::CourtesyFingerings),
            "--rename-parts" => flags.push(Flag::RenameParts),
            "--rehearsal" => flags.push(Flag::Rehearsal(value("--rehearsal")?)),
            "--split-multimeasure-rests" => flags.push(Flag::SplitMultimeasureRests),
            "--no-mark" => flags.push(Flag::NoMark),
            flag if flag.starts_with("--") => return Err(format!("Unknown flag {}", flag)),
            path => positional.push(path.to_string()),
        }
    }

    let instrument = instrument.ok_or("--instrument is required")?;
    let [input, output]: [String; 2] = positional
        .try_into()
        .map_err(|_| "Expected an input and an output path".to_string())?;

    Ok(Args {
        instrument,
        input,
        output,
        config,
        flags,
    })
}

fn build_options(args: &Args) -> Result<TransformOptions, String> {
    let mut options = match &args.config {
        Some(path) => {
            let content = read_file(path).map_err(|e| e.to_string())?;
            TransformOptions::from_yaml(&content).map_err(|e| e.to_string())?
        }
        None => TransformOptions::default(),
    };

    for flag in &args.flags {
        match flag {
            Flag::SourceKey(name) => {
                options.source_key = Some(parse_key(name).map_err(|e| e.to_string())?)
            }
            Flag::FingeringStyle(name) => {
                options.fingering_style = FingeringStyle::from_name(name)
                    .ok_or_else(|| format!("Invalid fingering style: {}", name))?
            }
            Flag::NoRhythm => options.simplify_rhythm = false,
            Flag::NoRange => options.transpose_for_range = false,
            Flag::NoInstrument => options.correct_instrument = false,
            Flag::Fingerings => options.add_fingerings = true,
            Flag::CourtesyAccidentals => options.add_courtesy_accidentals = true,
            Flag::CourtesyFingerings => options.add_courtesy_fingerings = true,
            Flag::RenameParts => options.rename_parts = true,
            Flag::Rehearsal(name) => {
                options.rehearsal_marks = parse_rehearsal_mode(name).map_err(|e| e.to_string())?
            }
            Flag::SplitMultimeasureRests => options.split_multimeasure_rests = true,
            Flag::NoMark => options.mark_processed = false,
        }
    }
    Ok(options)
}

fn read_file(path: &str) -> Result<String, ScoreError> {
    fs::read_to_string(path).map_err(|source| ScoreError::Io {
        path: path.to_string(),
        source,
    })
}

fn print_summary(report: &TransformReport, output: &str) {
    let stats = &report.stats;
    eprintln!("Wrote {}", output);
    eprintln!("  measures processed:    {}", stats.measures_processed);
    eprintln!("  notes merged:          {}", stats.notes_merged);
    eprintln!("  notes transposed:      {}", stats.notes_transposed);
    eprintln!("  accidentals corrected: {}", stats.accidentals_corrected);
    eprintln!("  accidentals added:     {}", stats.accidentals_added);
    eprintln!("  fingerings added:      {}", stats.fingerings_added);
    eprintln!("  rehearsal marks fixed: {}", stats.rehearsal_marks_fixed);
    eprintln!("  multi-measure rests:   {}", stats.multimeasure_rests_removed);
    for warning in &report.warnings {
        eprintln!("Warning: {}", warning);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let raw: Vec<String> = env::args().skip(1).collect();
    if raw.is_empty() || raw.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("{}", USAGE);
        process::exit(if raw.is_empty() { 1 } else { 0 });
    }

    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            process::exit(1);
        }
    };

    let options = match build_options(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let source = match read_file(&args.input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let (xml, report) = match simplify_musicxml(&source, &args.instrument, &options) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Transform error: {}", e);
            process::exit(1);
        }
    };

    if let Err(source) = fs::write(&args.output, &xml) {
        let e = ScoreError::Io {
            path: args.output.clone(),
            source,
        };
        eprintln!("{}", e);
        process::exit(1);
    }
    print_summary(&report, &args.output);
}
