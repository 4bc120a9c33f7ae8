use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["grocesphere"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
    assert!(!cli.demo);
    assert!(cli.stores.is_none());
}

#[test]
fn parses_nearest_with_negative_coordinates() {
    let cli = Cli::try_parse_from([
        "grocesphere",
        "nearest",
        "--lat",
        "-33.8688",
        "--lng",
        "151.2093",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Nearest { lat, lng, json: false })
            if (lat + 33.8688).abs() < 1e-9 && (lng - 151.2093).abs() < 1e-9
    ));
}

#[test]
fn global_flags_follow_the_subcommand() {
    let cli = Cli::try_parse_from([
        "grocesphere",
        "nearest",
        "--lat",
        "12.97",
        "--lng",
        "77.59",
        "--json",
        "--demo",
        "--stores",
        "/tmp/stores.yaml",
    ])
    .expect("expected valid cli args");
    assert!(cli.demo);
    assert_eq!(cli.stores, Some(PathBuf::from("/tmp/stores.yaml")));
    assert!(matches!(cli.command, Some(Commands::Nearest { json: true, .. })));
}

#[test]
fn nearest_requires_both_coordinates() {
    assert!(Cli::try_parse_from(["grocesphere", "nearest", "--lat", "12.97"]).is_err());
}

#[test]
fn simulate_defaults() {
    let cli = Cli::try_parse_from(["grocesphere", "simulate", "--lat", "12.97", "--lng", "77.59"])
        .expect("expected valid cli args");
    let Some(Commands::Simulate(args)) = cli.command else {
        panic!("expected simulate");
    };
    assert_eq!(args.mode, ModeArg::Delivery);
    assert!(args.items.is_empty());
    assert!(args.to_lat.is_none());
    assert!(!args.accept_switches);
    assert!(!args.pay_later);
    assert!(args.feed.is_none());
    assert_eq!(args.walk_steps, 30);
    assert_eq!(args.max_secs, 600);
}

#[test]
fn simulate_parses_items_mode_and_walk() {
    let cli = Cli::try_parse_from([
        "grocesphere",
        "simulate",
        "--lat",
        "12.9716",
        "--lng",
        "77.5946",
        "--to-lat",
        "12.9784",
        "--to-lng",
        "77.6408",
        "--mode",
        "pickup",
        "--item",
        "41:2",
        "--item",
        "61",
        "--accept-switches",
        "--pay-later",
        "--feed",
        "feed.jsonl",
    ])
    .expect("expected valid cli args");
    let Some(Commands::Simulate(args)) = cli.command else {
        panic!("expected simulate");
    };
    assert_eq!(OrderMode::from(args.mode), OrderMode::Pickup);
    assert_eq!(
        args.items,
        vec![("41".to_string(), 2), ("61".to_string(), 1)]
    );
    assert!(args.to_lat.is_some_and(|lat| (lat - 12.9784).abs() < 1e-9));
    assert!(args.accept_switches);
    assert!(args.pay_later);
    assert_eq!(args.feed, Some(PathBuf::from("feed.jsonl")));
}

#[test]
fn simulate_walk_needs_both_destination_coordinates() {
    let result = Cli::try_parse_from([
        "grocesphere",
        "simulate",
        "--lat",
        "12.97",
        "--lng",
        "77.59",
        "--to-lat",
        "12.98",
    ]);
    assert!(result.is_err());
}

#[test]
fn parse_item_rejects_bad_input() {
    assert!(parse_item("41:0").is_err());
    assert!(parse_item("41:many").is_err());
    assert!(parse_item(":3").is_err());
    assert_eq!(parse_item("41"), Ok(("41".to_string(), 1)));
}
