// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flowpane CLI entrypoint.
//!
//! Loads a diagram (from a diagram folder or the built-in demo), optionally applies a file of
//! wire-format commands, and then exports SVG, saves, or opens the terminal viewer. With no
//! output option the viewer is opened.

use std::error::Error;
use std::str::FromStr;

use flowpane::config::EngineConfig;
use flowpane::interact::InteractionConfig;
use flowpane::model::fixtures::two_apps_with_logical_flow;
use flowpane::model::DiagramId;
use flowpane::ops::CommandEnvelope;
use flowpane::panel::{DiagramListing, DiagramPanel};
use flowpane::render::{RetainedScene, SceneSync};
use flowpane::state::StateStore;
use flowpane::store::{
    DiagramFolder, DiagramStore, MemoryDiagramStore, MemoryFlowSpecStore, WriteDurability,
};
use log::{debug, info, warn, LevelFilter};

const DEMO_DIAGRAM_ID: &str = "demo";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<folder>] [--diagram <id>] [options]\n  {program} --demo [options]\n\nOptions:\n  --commands <file>   apply a JSON array of {{\"command\", \"payload\"}} envelopes\n  --svg <file>        export the synced scene as SVG\n  --save <id>         save the result into the folder under <id>\n  --list              list the diagrams in the folder\n  --view              open the terminal viewer (default when nothing else is asked for)\n  --config <file>     engine config JSON (missing fields keep their defaults)\n  --log-level <lvl>   off, error, warn (default), info, debug, trace\n  --durable-writes    fsync saved diagrams and their directory\n\nIf <folder> is omitted, the current working directory is used.\n--demo uses a built-in diagram and cannot be combined with <folder>, --diagram or --save."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    demo: bool,
    folder: Option<String>,
    diagram: Option<String>,
    commands: Option<String>,
    svg: Option<String>,
    save: Option<String>,
    config: Option<String>,
    log_level: Option<String>,
    list: bool,
    view: bool,
    durable_writes: bool,
}

impl CliOptions {
    fn opens_viewer(&self) -> bool {
        self.view || (self.svg.is_none() && self.save.is_none() && !self.list)
    }
}

fn set_once(slot: &mut Option<String>, value: Option<String>) -> Result<(), ()> {
    if slot.is_some() {
        return Err(());
    }
    *slot = Some(value.ok_or(())?);
    Ok(())
}

fn set_flag(flag: &mut bool) -> Result<(), ()> {
    if *flag {
        return Err(());
    }
    *flag = true;
    Ok(())
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--demo" => set_flag(&mut options.demo)?,
            "--list" => set_flag(&mut options.list)?,
            "--view" => set_flag(&mut options.view)?,
            "--durable-writes" => set_flag(&mut options.durable_writes)?,
            "--diagram" => set_once(&mut options.diagram, args.next())?,
            "--commands" => set_once(&mut options.commands, args.next())?,
            "--svg" => set_once(&mut options.svg, args.next())?,
            "--save" => set_once(&mut options.save, args.next())?,
            "--config" => set_once(&mut options.config, args.next())?,
            "--log-level" => set_once(&mut options.log_level, args.next())?,
            _ if arg.starts_with('-') => return Err(()),
            _ => set_once(&mut options.folder, Some(arg))?,
        }
    }

    if options.demo
        && (options.folder.is_some() || options.diagram.is_some() || options.save.is_some())
    {
        return Err(());
    }

    Ok(options)
}

fn main() {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "flowpane".to_owned());

    let options = match parse_options(args) {
        Ok(options) => options,
        Err(()) => {
            print_usage(&program);
            std::process::exit(2);
        }
    };

    let raw_level = options.log_level.as_deref().unwrap_or("warn");
    let log_level = LevelFilter::from_str(raw_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {raw_level}. Using 'warn' instead.");
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
    debug!(options:?; "Parsed arguments");

    if let Err(err) = run(&options) {
        eprintln!("flowpane: {err}");
        std::process::exit(1);
    }
}

fn run(options: &CliOptions) -> Result<(), Box<dyn Error>> {
    let config = match &options.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let store = StateStore::new(config);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    if options.demo {
        let id = DiagramId::new(DEMO_DIAGRAM_ID)?;
        let diagrams = MemoryDiagramStore::new().with_diagram(id, two_apps_with_logical_flow());
        let panel = DiagramPanel::new(store.clone(), diagrams, MemoryFlowSpecStore::new());
        runtime.block_on(prepare(&panel, options, Some(DEMO_DIAGRAM_ID)))?;
    } else {
        let dir = options.folder.clone().unwrap_or_else(|| ".".to_owned());
        let durability = if options.durable_writes {
            WriteDurability::Durable
        } else {
            WriteDurability::BestEffort
        };
        let folder = DiagramFolder::new(dir).with_durability(durability);
        let panel = DiagramPanel::new(store.clone(), folder, MemoryFlowSpecStore::new());
        runtime.block_on(prepare(&panel, options, options.diagram.as_deref()))?;
    }

    if let Some(path) = &options.svg {
        let mut scene = SceneSync::new(RetainedScene::new(), store.config().clone());
        let report = scene.sync(&store.state());
        if !report.dangling.is_empty() {
            warn!(dangling = report.dangling.len(); "Exported scene skips dangling references");
        }
        svg::save(path, &scene.surface().to_svg(store.config()))?;
        info!(path = path.as_str(), elements = scene.surface().len(); "Wrote SVG");
    }

    if options.opens_viewer() {
        flowpane::tui::run(store, InteractionConfig::default())?;
    }

    Ok(())
}

/// Lists, loads, applies commands and saves through the panel; everything that needs the store.
async fn prepare<D>(
    panel: &DiagramPanel<D, MemoryFlowSpecStore>,
    options: &CliOptions,
    diagram: Option<&str>,
) -> Result<(), Box<dyn Error>>
where
    D: DiagramStore,
{
    if options.list {
        panel.refresh().await?;
        for listing in panel.listings() {
            println!("{}\t{}", listing.id, listing.title.as_deref().unwrap_or(""));
        }
    }

    match diagram {
        Some(raw) => {
            let listing = DiagramListing {
                id: DiagramId::new(raw)?,
                title: None,
                notable: false,
            };
            panel.select_diagram(listing).await?;
            if options.commands.is_some() || options.save.is_some() {
                panel.edit_diagram();
            }
        }
        None => {
            panel.create_diagram(&[]);
        }
    }

    if let Some(path) = &options.commands {
        let raw = std::fs::read_to_string(path)?;
        let envelopes: Vec<CommandEnvelope> = serde_json::from_str(&raw)?;
        let report = panel.state().process_envelopes(&envelopes);
        for rejected in &report.rejected {
            warn!(
                index = rejected.index,
                command = rejected.command.as_str(),
                error:% = rejected.error;
                "Command rejected"
            );
        }
        info!(applied = report.applied, rejected = report.rejected.len(); "Applied commands");
    }

    if let Some(raw) = &options.save {
        let id = DiagramId::new(raw.as_str())?;
        panel.save(&id).await?;
        info!(diagram = id.as_str(); "Saved diagram");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use flowpane::model::fixtures::two_apps_with_logical_flow;
    use flowpane::model::DiagramId;
    use flowpane::panel::DiagramPanel;
    use flowpane::state::StateStore;
    use flowpane::store::{DiagramStore, MemoryDiagramStore, MemoryFlowSpecStore};

    use super::{parse_options, prepare, CliOptions};

    fn parse(args: &[&str]) -> Result<CliOptions, ()> {
        parse_options(args.iter().map(|arg| (*arg).to_owned()))
    }

    #[test]
    fn parses_empty_args() {
        let options = parse(&[]).expect("parse options");
        assert_eq!(options, CliOptions::default());
        assert!(options.opens_viewer());
    }

    #[test]
    fn parses_demo_with_svg_export() {
        let options = parse(&["--svg", "out.svg", "--demo"]).expect("parse options");
        assert!(options.demo);
        assert_eq!(options.svg.as_deref(), Some("out.svg"));
        assert!(!options.opens_viewer());
    }

    #[test]
    fn parses_positional_folder_and_diagram() {
        let options = parse(&["diagrams", "--diagram", "orders", "--commands", "cmds.json"])
            .expect("parse options");
        assert_eq!(options.folder.as_deref(), Some("diagrams"));
        assert_eq!(options.diagram.as_deref(), Some("orders"));
        assert_eq!(options.commands.as_deref(), Some("cmds.json"));
        assert!(options.opens_viewer());
    }

    #[test]
    fn explicit_view_opens_the_viewer_alongside_exports() {
        let options = parse(&["--demo", "--svg", "out.svg", "--view"]).expect("parse options");
        assert!(options.opens_viewer());
    }

    #[test]
    fn rejects_demo_with_folder_diagram_or_save() {
        assert!(parse(&["--demo", "diagrams"]).is_err());
        assert!(parse(&["--demo", "--diagram", "orders"]).is_err());
        assert!(parse(&["--demo", "--save", "copy"]).is_err());
    }

    #[test]
    fn rejects_unknown_args() {
        assert!(parse(&["--nope"]).is_err());
    }

    #[test]
    fn rejects_duplicate_flags_and_values() {
        assert!(parse(&["--list", "--list"]).is_err());
        assert!(parse(&["--svg", "a.svg", "--svg", "b.svg"]).is_err());
        assert!(parse(&["one", "two"]).is_err());
    }

    #[tokio::test]
    async fn resaving_a_loaded_diagram_keeps_its_title() {
        let id = DiagramId::new("orders").expect("diagram id");
        let diagrams =
            MemoryDiagramStore::new().with_diagram(id.clone(), two_apps_with_logical_flow());
        let panel = DiagramPanel::new(StateStore::default(), diagrams, MemoryFlowSpecStore::new());
        let options = parse(&["--diagram", "orders", "--save", "orders"]).expect("parse options");

        prepare(&panel, &options, options.diagram.as_deref())
            .await
            .expect("prepare");

        let saved = panel.diagram_store().load_diagram(&id).await.expect("saved");
        assert_eq!(saved.title.as_deref(), Some("Order flow"));
    }

    #[test]
    fn rejects_missing_values() {
        assert!(parse(&["--diagram"]).is_err());
        assert!(parse(&["--log-level"]).is_err());
    }
}
