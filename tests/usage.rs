use flagtree::{
    BindError, BindingKind, ErrorHandling, Field, Filler, FillerConfig, Schema, Walker,
    pretty_struct,
};
use pretty_assertions::assert_eq;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Default, Serialize)]
struct Zip {
    config_file: String,
    compress: Compress,
    help: (),
}

#[derive(Debug, Default, Serialize)]
struct Compress {
    profile: String,
    skip: bool,
    zip_file: ZipFile,
}

#[derive(Debug, Default, Serialize)]
struct ZipFile {
    file_name: String,
}

impl Schema for Zip {
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
        walker.field(Field::new("help").with_usage("help").as_action(), &mut self.help)
    }
}

impl Schema for Compress {
    fn walk<'a>(&'a mut self, walker: &mut Walker<'_, 'a>) -> Result<(), BindError> {
        walker.field(Field::new("profile"), &mut self.profile)?;
        walker.field(Field::new("skip").with_alias("s"), &mut self.skip)?;
        walker.field(
            Field::new("zip_file").with_usage("zip a file").as_action(),
            &mut self.zip_file,
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

fn zip() -> Zip {
    let mut zip = Zip {
        config_file: "default.conf".into(),
        ..Zip::default()
    };
    zip.compress.zip_file.file_name = "out.zip".into();
    zip
}

fn config() -> FillerConfig {
    FillerConfig::default().with_error_handling(ErrorHandling::ContinueOnError)
}

#[test]
fn usage_lists_options_then_actions() {
    let mut zip = zip();
    let mut filler = Filler::with_config("zip", "a zip command", config());
    filler.fill(&mut zip).unwrap();
    assert_eq!(
        filler.usage_str(),
        "a zip command\n\
         \x20 - config-file: working profile\n\
         \x20 \tdefault:default.conf\n\
         \x20 = compress: to compress things\n\
         \x20   - profile: \n\
         \x20   - s: \n\
         \x20   \tdefault:false\n\
         \x20   = zip-file: zip a file\n\
         \x20     - f: specify file name\n\
         \x20     \tdefault:out.zip\n\
         \x20 = help: help\n"
    );
}

#[test]
fn act_usage_looks_up_by_field_name() {
    let mut zip = zip();
    let mut filler = Filler::with_config("zip", "a zip command", config());
    filler.fill(&mut zip).unwrap();
    assert_eq!(filler.act_usage("help"), "help\n");
    assert!(filler.act_usage("compress").starts_with("to compress things\n"));
    assert_eq!(filler.act_usage("zip_file"), "");
}

#[test]
fn defaults_are_captured_at_bind_time() {
    let mut zip = zip();
    let mut filler = Filler::with_config("zip", "", config());
    filler.fill(&mut zip).unwrap();
    filler.parse_args(["-config-file", "other.conf"]).unwrap();
    let flag = filler.flagset().lookup("config-file").unwrap();
    assert_eq!(flag.default_value(), "default.conf");
    assert_eq!(flag.current_value(), "other.conf");
    assert_eq!(flag.kind(), BindingKind::Scalar);
}

#[test]
fn usage_json_mirrors_the_tree() {
    let mut zip = zip();
    let mut filler = Filler::with_config("zip", "a zip command", config());
    filler.fill(&mut zip).unwrap();
    let json: Value = serde_json::from_str(&filler.usage_json().unwrap()).unwrap();

    assert_eq!(json["name"], "zip");
    assert!(json.get("field").is_none());
    assert_eq!(json["options"][0]["name"], "config-file");
    assert_eq!(json["options"][0]["default"], "default.conf");
    assert_eq!(json["options"][0]["kind"], "scalar");

    let compress = &json["actions"][0];
    assert_eq!(compress["name"], "compress");
    assert_eq!(compress["field"], "compress");
    assert!(compress["options"][0].get("default").is_none());
    assert_eq!(compress["actions"][0]["field"], "zip_file");
    assert_eq!(json["actions"][1]["name"], "help");
}

#[test]
fn pretty_print_after_parse() {
    let mut zip = zip();
    let acts = {
        let mut filler = Filler::with_config("zip", "", config());
        filler.fill(&mut zip).unwrap();
        filler
            .parse_args([
                "-config-file",
                "x.conf",
                "compress",
                "-s",
                "zip-file",
                "-f",
                "a.zip",
            ])
            .unwrap()
    };
    assert_eq!(acts, vec!["compress", "zip_file"]);
    assert_eq!(
        pretty_struct(&zip, "").unwrap(),
        "config_file:x.conf\n\
         compress:\n\
         \x20   profile:\n\
         \x20   skip:true\n\
         \x20   zip_file:\n\
         \x20       file_name:a.zip\n\
         help:nil\n"
    );
}

#[test]
fn help_token_is_reported() {
    let mut zip = zip();
    let mut filler = Filler::with_config("zip", "", config());
    filler.fill(&mut zip).unwrap();
    assert!(filler.parse_args(["compress", "-help"]).unwrap_err().is_help());
    assert_eq!(filler.parse_args(["help"]).unwrap(), vec!["help"]);
}
