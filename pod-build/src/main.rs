use anyhow::{Context, Result};
use crossterm::{
    style::{self, Colorize, Styler},
    QueueableCommand,
};
use log::info;
use std::{
    fs::File,
    io::{stderr, stdin, stdout, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};
use structopt::StructOpt;

use pod_build::{
    backends::{HostLookup, PasswdLookup},
    BuildArgs, ConfigFile, ImageConfig, UserCommand, UserLookup, Validation,
};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "pod-build",
    about = "Applies image build directives to an image config."
)]
enum Opt {
    /// Sets the user the image runs as, like a USER directive.
    User {
        /// The user and optional group, as `user[:group]`.
        user: String,

        #[structopt(short, long, parse(from_os_str))]
        /// Image config to update. Read from stdin if not given.
        config: Option<PathBuf>,

        #[structopt(short, long, parse(from_os_str))]
        /// Where to write the updated config. Written to stdout if not given.
        output: Option<PathBuf>,

        #[structopt(long = "build-arg", number_of_values = 1)]
        /// A build arg, as `KEY=VALUE`.
        build_args: Vec<String>,

        #[structopt(long = "arg", number_of_values = 1)]
        /// Declares a build arg, as `ARG NAME[=DEFAULT]` would.
        args: Vec<String>,

        #[structopt(long, parse(from_os_str))]
        /// Look users up in this passwd file instead of the host's database.
        passwd: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    pretty_env_logger::init_custom_env("LOG");

    let opt = Opt::from_args();

    let mut stderr = stderr();

    match opt {
        Opt::User {
            user,
            config,
            output,
            build_args,
            args,
            passwd,
        } => {
            let mut file = read_config(config.as_deref())?;
            info!("loaded image config");

            let mut build_args = BuildArgs::new(build_args);
            for arg in args {
                build_args.declare_arg(arg);
            }

            let unused = build_args.unused();
            if !unused.is_empty() {
                let unused = unused.into_iter().collect::<Vec<_>>().join(", ");
                stderr
                    .queue(style::PrintStyledContent("WARN: ".yellow().bold()))?
                    .queue(style::Print(format!(
                        "build args were not consumed: {}\n",
                        unused
                    )))?
                    .flush()?;
            }

            let lookup: Box<dyn UserLookup> = match passwd {
                Some(path) => {
                    info!("looking up users in {:?}", path);
                    Box::new(PasswdLookup::new(path))
                }
                None => Box::new(HostLookup::new()),
            };

            let command = UserCommand::new(user);
            let validation = command
                .execute(file.config_mut(), &build_args, lookup.as_ref())
                .with_context(|| format!("failed to execute {}", command))?;

            print_status(&mut stderr, &command, file.config(), &validation)?;
            write_config(output.as_deref(), &file)?;
        }
    }

    Ok(())
}

fn read_config(path: Option<&Path>) -> Result<ConfigFile> {
    let mut contents = String::new();
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("couldn't open image config {:?}", path))?;
            BufReader::new(file).read_to_string(&mut contents)?;
        }
        None => {
            stdin().read_to_string(&mut contents)?;
        }
    }

    let file = ConfigFile::from_json(&contents).context("couldn't parse image config")?;
    Ok(file)
}

fn write_config(path: Option<&Path>, file: &ConfigFile) -> Result<()> {
    let mut writer: Box<dyn Write> = match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("couldn't create image config {:?}", path))?,
        )),
        None => Box::new(stdout()),
    };

    serde_json::to_writer_pretty(&mut writer, file)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}

fn print_status(
    out: &mut impl Write,
    command: &UserCommand,
    config: &ImageConfig,
    validation: &Validation,
) -> Result<()> {
    let status = match validation {
        Validation::Verified(_) => "verified".green().bold(),
        Validation::Skipped(_) => "unverified".yellow().bold(),
    };

    out.queue(style::Print(format!("{} ", command)))?
        .queue(style::PrintStyledContent(status))?
        .queue(style::Print(format!(" => {}\n", config.user)))?
        .flush()?;

    Ok(())
}
