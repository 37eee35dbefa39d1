use color_print::cformat;
use indexmap::IndexMap;
use ionc::util::display::{print_code, print_program};
use ionc::{Config, Error, Lexer, Parser, SymbolMap};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input file
    #[clap(default_value = "main.ion")]
    input: String,

    /// Output file [default: <INPUT>.asm]
    #[clap(short, long)]
    output: Option<String>,

    /// Config file [default: ion.yaml if present]
    #[clap(short, long)]
    config: Option<String>,

    /// Write symbol map (YAML)
    #[clap(short, long)]
    symbols: Option<String>,

    /// Dump parsed program and generated code
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    use clap::Parser as _;

    let args = Args::parse();
    println!("Ion Compiler by kanade-k-1228");

    let config = match Config::discover(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(&[e], &IndexMap::new()),
    };
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.output_for(&args.input));
    let symbols = args.symbols.clone().or(config.symbols.clone());
    let verbose = args.verbose || config.verbose;

    println!("1. Tokenize");
    println!("  < {}", &args.input);
    let source = match std::fs::read_to_string(&args.input) {
        Ok(source) => source,
        Err(e) => fail(&[Error::Io(e)], &IndexMap::new()),
    };
    let mut sources: IndexMap<String, Vec<String>> = IndexMap::new();
    sources.insert(
        args.input.clone(),
        source.lines().map(str::to_string).collect(),
    );
    let (tokens, mut errors) = Lexer::new(&args.input, &source).parse();

    println!("2. Parse");
    let (program, parse_errors) = Parser::new(tokens.into_iter()).parse();
    errors.extend(parse_errors);
    let program = match program {
        Some(program) if errors.is_empty() => program,
        _ => fail(&errors, &sources),
    };
    if verbose {
        print_program(&program);
    }

    println!("3. Assemble");
    let code = match program.assemble() {
        Ok(code) => code,
        Err(e) => fail(&[e], &sources),
    };
    if verbose {
        print_code(&code);
    }

    println!("4. Write");
    println!("  > {}", &output);
    if let Err(e) = std::fs::write(&output, code.to_string()) {
        fail(&[Error::Io(e)], &sources);
    }
    if let Some(path) = symbols {
        println!("  > {}", &path);
        let written = SymbolMap::generate(&program)
            .to_yaml()
            .map_err(Error::from)
            .and_then(|yaml| std::fs::write(&path, yaml).map_err(Error::from));
        if let Err(e) = written {
            fail(&[e], &sources);
        }
    }
}

fn fail(errors: &[Error], sources: &IndexMap<String, Vec<String>>) -> ! {
    for e in errors {
        e.print_diag(sources);
    }
    eprintln!(
        "{}",
        cformat!("<r,s>Compilation failed</>: {} error(s)", errors.len())
    );
    std::process::exit(1);
}
