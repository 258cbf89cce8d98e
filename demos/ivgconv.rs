//! Very simple tool that converts SVG icon into IconVG
use ivgconv::*;
use std::{
    env,
    fs::File,
    io::{Read, Write},
};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

type Error = Box<dyn std::error::Error>;

#[derive(Debug)]
struct Args {
    input_file: String,
    output_file: String,
    options: ConvertOptions,
}

impl Args {
    fn parse() -> Result<Args, Error> {
        let mut options_file = None;
        let mut output_size = None;
        let mut foreground = None;
        let mut input_file = String::new();
        let mut output_file = String::new();
        let mut positional = 0;
        let mut args = env::args();
        let cmd = args.next().unwrap_or_else(|| "ivgconv".to_owned());
        while let Some(arg) = args.next() {
            match arg.as_ref() {
                "-h" => {
                    positional = 0;
                    break;
                }
                "-s" => {
                    let size: Scalar = args.next().ok_or("-s requires argument")?.parse()?;
                    if size < EPSILON {
                        return Err("output size is too small".into());
                    }
                    output_size.replace(size);
                }
                "-fg" => {
                    let fg: Rgba = args
                        .next()
                        .ok_or("-fg requires color #rrggbb(aa) argument")?
                        .parse()?;
                    foreground.replace(fg);
                }
                "-c" => {
                    options_file.replace(args.next().ok_or("-c requires argument")?);
                }
                _ => {
                    positional += 1;
                    match positional {
                        1 => input_file = arg,
                        2 => output_file = arg,
                        _ => return Err("unexpected positional argument".into()),
                    }
                }
            }
        }
        if positional < 2 {
            eprintln!("Very simple tool that converts SVG icon into IconVG");
            eprintln!("\nUSAGE:");
            eprintln!(
                "    {} [-s <size>] [-fg <color>] [-c <options.json>] <icon.svg> <icon.ivg>",
                cmd
            );
            eprintln!("\nARGS:");
            eprintln!(
                "    -s <size>          size of the output icon (default: {})",
                DEFAULT_OUTPUT_SIZE
            );
            eprintln!("    -fg <color>        foreground color stored in the palette");
            eprintln!("    -c <options.json>  conversion options in JSON format");
            eprintln!("    <icon.svg>         SVG document ('-' means stdin)");
            eprintln!("    <icon.ivg>         IconVG output ('-' means stdout)");
            std::process::exit(1);
        }

        let mut options = match options_file {
            None => ConvertOptions::default(),
            Some(path) => {
                let mut text = String::new();
                File::open(path)?.read_to_string(&mut text)?;
                ConvertOptions::from_json(&text)?
            }
        };
        if let Some(size) = output_size {
            options = options.with_output_size(size);
        }
        if let Some(fg) = foreground {
            options = options.with_foreground(fg);
        }
        Ok(Args {
            input_file,
            output_file,
            options,
        })
    }
}

/// Load SVG document
fn svg_load(path: &str) -> Result<Vec<u8>, Error> {
    let mut contents = Vec::new();
    if path != "-" {
        File::open(path)?.read_to_end(&mut contents)?;
    } else {
        std::io::stdin().read_to_end(&mut contents)?;
    }
    Ok(contents)
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse()?;
    tracing::debug!("[options] {:?}", args.options);

    let contents = svg_load(&args.input_file)?;
    let icon = convert(contents, &args.options)?;
    tracing::debug!("[icon:size] {}", icon.len());

    tracing::debug_span!("[save]").in_scope(|| {
        if args.output_file != "-" {
            File::create(&args.output_file)?.write_all(&icon)?;
        } else {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&icon)?;
            stdout.flush()?;
        }
        Ok::<_, Error>(())
    })?;

    Ok(())
}
