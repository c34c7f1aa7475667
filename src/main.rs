use anyhow::Result;
use flagtree::{BindError, Field, Filler, Schema, Walker, pretty_struct};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// A zip-like tool, to show nested actions.
#[derive(Debug, Default, Serialize)]
struct ZipCli {
    config_file: String,
    compress: Compress,
    extract: Extract,
    help: (),
}

#[derive(Debug, Default, Serialize)]
struct Compress {
    profile: String,
    skip: bool,
    no_flag: String,
    dry_run: (),
    zip_folder: ZipFolder,
    zip_file: ZipFile,
}

#[derive(Debug, Default, Serialize)]
struct ZipFolder {
    folder_name: String,
}

#[derive(Debug, Default, Serialize)]
struct ZipFile {
    file_name: String,
}

#[derive(Debug, Default, Serialize)]
struct Extract {
    input_file: String,
}

impl Schema for ZipCli {
    fn walk<'a>(&'a mut self, walker: &mut Walker<'_, 'a>) -> Result<(), BindError> {
        walker.field(
            Field::new("config_file").with_usage("working profile"),
            &mut self.config_file,
        )?;
        walker.field(
            Field::new("compress")
                .with_usage("to compress things")
                .as_action(),
            &mut self.compress,
        )?;
        walker.field(
            Field::new("extract")
                .with_usage("to unzip things")
                .as_action(),
            &mut self.extract,
        )?;
        walker.field(Field::new("help").with_usage("help").as_action(), &mut self.help)
    }
}

impl Schema for Compress {
    fn walk<'a>(&'a mut self, walker: &mut Walker<'_, 'a>) -> Result<(), BindError> {
        walker.field(Field::new("profile"), &mut self.profile)?;
        walker.field(Field::new("skip").with_alias("s"), &mut self.skip)?;
        walker.field(Field::new("no_flag").skipped(), &mut self.no_flag)?;
        walker.field(
            Field::new("dry_run")
                .with_usage("dry run, doesn't actually create any file")
                .as_action(),
            &mut self.dry_run,
        )?;
        walker.field(
            Field::new("zip_folder")
                .with_usage("zip a folder")
                .as_action(),
            &mut self.zip_folder,
        )?;
        walker.field(
            Field::new("zip_file").with_usage("zip a file").as_action(),
            &mut self.zip_file,
        )
    }
}

impl Schema for ZipFolder {
    fn walk<'a>(&'a mut self, walker: &mut Walker<'_, 'a>) -> Result<(), BindError> {
        walker.field(
            Field::new("folder_name")
                .with_alias("folder")
                .with_usage("specify folder name"),
            &mut self.folder_name,
        )
    }
}

impl Schema for ZipFile {
    fn walk<'a>(&'a mut self, walker: &mut Walker<'_, 'a>) -> Result<(), BindError> {
        walker.field(
            Field::new("file_name")
                .with_alias("f")
                .with_usage("specify file name"),
            &mut self.file_name,
        )
    }
}

impl Schema for Extract {
    fn walk<'a>(&'a mut self, walker: &mut Walker<'_, 'a>) -> Result<(), BindError> {
        walker.field(
            Field::new("input_file").with_usage("input zip file"),
            &mut self.input_file,
        )
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut cli = ZipCli {
        config_file: "default.conf".to_string(),
        ..ZipCli::default()
    };
    cli.compress.zip_file.file_name = "defaultzip.file".to_string();

    let (actions, usage) = {
        let mut filler = Filler::new("zipcli", "a zip command");
        filler.fill(&mut cli)?;
        let actions = filler.parse()?;
        let usage = actions
            .first()
            .filter(|act| act.as_str() == "help")
            .map(|_| filler.usage_str());
        (actions, usage)
    };

    if let Some(usage) = usage {
        print!("{usage}");
        return Ok(());
    }
    println!("parsed actions {actions:?}");
    print!("{}", pretty_struct(&cli, "")?);
    Ok(())
}
