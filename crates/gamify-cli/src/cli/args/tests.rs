use super::*;
use clap::CommandFactory;
use clap::Parser;

#[test]
fn cli_debug_assert() {
    Cli::command().debug_assert();
}

#[test]
fn award_parses_with_defaults() {
    let cli = Cli::try_parse_from([
        "gamify", "award", "--actor", "alice", "--xp", "150", "--reason", "demo",
    ])
    .expect("parse should succeed");

    assert_eq!(cli.global.tenant, "default");
    assert_eq!(cli.global.format, OutputFormat::Text);
    match cli.cmd {
        Command::Award(args) => {
            assert_eq!(args.actor, "alice");
            assert_eq!(args.role, Role::Member);
            assert_eq!(args.user, None);
            assert_eq!(args.xp, 150);
            assert_eq!(args.coins, 0);
            assert_eq!(args.action_type, "manual_award");
        }
        _ => panic!("expected Command::Award"),
    }
}

#[test]
fn global_flags_are_accepted_after_the_subcommand() {
    let cli = Cli::try_parse_from([
        "gamify",
        "leaderboard",
        "--period",
        "weekly",
        "--limit",
        "5",
        "--tenant",
        "acme",
        "--format",
        "json",
    ])
    .expect("parse should succeed");

    assert_eq!(cli.global.tenant, "acme");
    assert_eq!(cli.global.format, OutputFormat::Json);
    match cli.cmd {
        Command::Leaderboard(args) => {
            assert_eq!(args.period, LeaderboardPeriod::Weekly);
            assert_eq!(args.limit, Some(5));
            assert_eq!(args.viewer, None);
        }
        _ => panic!("expected Command::Leaderboard"),
    }
}

#[test]
fn mission_create_parses_window_and_type() {
    let cli = Cli::try_parse_from([
        "gamify",
        "mission",
        "create",
        "--name",
        "Close 3 tickets",
        "--type",
        "one-time",
        "--target",
        "3",
        "--trigger",
        "ticket_closed",
        "--starts-at",
        "2026-10-01T00:00:00Z",
    ])
    .expect("parse should succeed");

    match cli.cmd {
        Command::Mission(m) => match m.cmd {
            MissionSub::Create(args) => {
                assert_eq!(args.mission_type, gamify_core::model::MissionType::OneTime);
                assert_eq!(args.target, 3);
                assert_eq!(args.trigger.as_deref(), Some("ticket_closed"));
                assert!(args.starts_at.is_some());
                assert!(args.ends_at.is_none());
            }
            _ => panic!("expected MissionSub::Create"),
        },
        _ => panic!("expected Command::Mission"),
    }
}

#[test]
fn unknown_role_is_rejected() {
    let res = Cli::try_parse_from([
        "gamify", "award", "--actor", "a", "--role", "root", "--xp", "1", "--reason", "r",
    ]);
    assert!(res.is_err());
}

#[test]
fn reward_buy_requires_user_and_reward() {
    assert!(Cli::try_parse_from(["gamify", "reward", "buy", "--user", "u1"]).is_err());
    let cli = Cli::try_parse_from(["gamify", "reward", "buy", "--user", "u1", "--reward", "7"])
        .expect("parse should succeed");
    match cli.cmd {
        Command::Reward(r) => match r.cmd {
            RewardSub::Buy { user, reward } => {
                assert_eq!(user, "u1");
                assert_eq!(reward, 7);
            }
            _ => panic!("expected RewardSub::Buy"),
        },
        _ => panic!("expected Command::Reward"),
    }
}
