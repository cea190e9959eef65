use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use msgfmt_message::{parse, Arguments, Renderer, Root, Value};
use msgfmt_plural::{Operands, PluralCategory};
use tracing::{debug, info_span};

mod logging;

#[derive(Parser)]
#[command(
    name = "msgfmt",
    about = "Parse and render ICU-style message templates",
    author,
    version
)]
struct Cli {
    /// 渲染與複數分類使用的語系。 / Locale used for rendering and plural categories.
    #[arg(
        long,
        global = true,
        env = "MSGFMT_LOCALE",
        default_value = "en_US",
        value_name = "LOCALE"
    )]
    locale: String,

    /// 輸出除錯訊息至 stderr。 / Print debug diagnostics to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 以參數渲染樣板。 / Render a template with arguments.
    Render(RenderArgs),
    /// 顯示樣板解析後的訊息樹。 / Show the message tree of a template.
    Parse(ParseArgs),
    /// 顯示數字的複數分類。 / Show the plural category of numbers.
    Category(CategoryArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// 樣板文字；`-` 代表從標準輸入讀取。 / Template text, or `-` to read stdin.
    template: String,

    /// 具名參數，可重複指定。 / Named argument, may be repeated.
    #[arg(long = "arg", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    args: Vec<(String, Value)>,

    /// 從 JSON 物件檔載入參數。 / Load arguments from a JSON object file.
    #[arg(long, value_name = "FILE")]
    args_file: Option<PathBuf>,

    /// 缺少的變數視為錯誤。 / Treat missing variables as errors.
    #[arg(long)]
    strict: bool,
}

#[derive(Args)]
struct ParseArgs {
    /// 樣板文字；`-` 代表從標準輸入讀取。 / Template text, or `-` to read stdin.
    template: String,

    /// 以 JSON 輸出訊息樹。 / Print the tree as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CategoryArgs {
    /// 要分類的數字。 / Numbers to categorize.
    #[arg(required = true, allow_negative_numbers = true, value_name = "NUMBER")]
    numbers: Vec<String>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("msgfmt error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;
    debug!(locale = %cli.locale, "starting");

    match cli.command {
        Commands::Render(args) => run_render(&cli.locale, args),
        Commands::Parse(args) => run_parse(args),
        Commands::Category(args) => run_category(&cli.locale, args),
    }
}

fn run_render(locale: &str, args: RenderArgs) -> Result<()> {
    let root = load_template(&args.template)?;

    let mut arguments = match &args.args_file {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str::<Arguments>(&contents)
                .with_context(|| format!("failed to parse arguments file {}", path.display()))?
        }
        None => Arguments::new(),
    };
    arguments.extend(args.args);

    for name in root.declared_arguments() {
        if !arguments.contains(name) {
            debug!(%name, "argument not supplied");
        }
    }

    let _span = info_span!("render", %locale, strict = args.strict).entered();
    let rendered = Renderer::new(locale)
        .strict(args.strict)
        .render(&root, &arguments)
        .context("failed to render template")?;
    debug!(bytes = rendered.len(), "rendered");
    println!("{rendered}");
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<()> {
    let root = load_template(&args.template)?;
    if args.json {
        let json = serde_json::to_string_pretty(&root).context("failed to serialize tree")?;
        println!("{json}");
    } else {
        println!("{:#?}", root.body());
        let declared: Vec<&str> = root.declared_arguments().iter().map(String::as_str).collect();
        println!("arguments: {}", declared.join(", "));
    }
    Ok(())
}

fn run_category(locale: &str, args: CategoryArgs) -> Result<()> {
    for raw in &args.numbers {
        let operands = parse_operands(raw)?;
        let category: PluralCategory = msgfmt_plural::category(locale, operands);
        println!("{raw}: {category}");
    }
    Ok(())
}

fn load_template(source: &str) -> Result<Root> {
    let template = if source == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read template from stdin")?;
        let trimmed = buffer.trim_end_matches(['\r', '\n']).len();
        buffer.truncate(trimmed);
        buffer
    } else {
        source.to_string()
    };

    let _span = info_span!("parse", bytes = template.len()).entered();
    let root = parse(&template).with_context(|| format!("failed to parse template {template:?}"))?;
    debug!(arguments = root.declared_arguments().len(), "parsed");
    Ok(root)
}

/// `NAME=VALUE`; values that print back unchanged as a number become numeric.
fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let Some((name, value)) = raw.split_once('=') else {
        return Err(format!("expected NAME=VALUE, got '{raw}'"));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing argument name in '{raw}'"));
    }
    Ok((name.to_string(), numeric_value(value)))
}

fn numeric_value(raw: &str) -> Value {
    if let Ok(value) = raw.parse::<i64>() {
        if value.to_string() == raw {
            return Value::Int(value);
        }
    }
    if let Ok(value) = raw.parse::<f64>() {
        if value.is_finite() && value.to_string() == raw {
            return Value::Float(value);
        }
    }
    Value::Str(raw.to_string())
}

fn parse_operands(raw: &str) -> Result<Operands> {
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(Operands::from(value));
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Operands::from(value)),
        _ => bail!("'{raw}' is not a number"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_keep_non_canonical_numbers_as_text() {
        assert_eq!(
            parse_assignment("n=21").unwrap(),
            ("n".to_string(), Value::Int(21))
        );
        assert_eq!(
            parse_assignment("ratio=2.5").unwrap(),
            ("ratio".to_string(), Value::Float(2.5))
        );
        assert_eq!(
            parse_assignment("phone=+79131234567").unwrap(),
            ("phone".to_string(), Value::from("+79131234567"))
        );
        assert_eq!(
            parse_assignment("code=007").unwrap(),
            ("code".to_string(), Value::from("007"))
        );
        assert_eq!(
            parse_assignment("eq=a=b").unwrap(),
            ("eq".to_string(), Value::from("a=b"))
        );
    }

    #[test]
    fn assignments_need_a_name() {
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=5").is_err());
    }

    #[test]
    fn operands_accept_integers_and_decimals() {
        assert_eq!(parse_operands("21").unwrap(), Operands::from(21_i64));
        assert_eq!(parse_operands("1.5").unwrap(), Operands::from(1.5));
        assert!(parse_operands("many").is_err());
        assert!(parse_operands("NaN").is_err());
    }
}
