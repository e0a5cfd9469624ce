use super::common::{small_config, small_training_config};
use crate::config::{GameConfig, RewardConfig, SnakeConfig, TrainingConfig};
use crate::env::{AgentId, Direction};
use crate::persistence::CheckpointPaths;
use crate::trainer::{Trainer, LOG_HEADER};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_tick_advances_context() {
    let mut trainer = Trainer::with_seed(small_config(), 1).unwrap();
    trainer.tick().unwrap();

    let context = trainer.context();
    assert_eq!(context.global_step, 1);
    assert!(context.epsilon[0] < 1.0);
    assert_eq!(context.epsilon[0], context.epsilon[1]);
    assert_eq!(trainer.agent(AgentId::One).memory().len(), 1);
    assert_eq!(trainer.agent(AgentId::Two).memory().len(), 1);
}

#[test]
fn test_episode_respects_step_cap() {
    let mut trainer = Trainer::with_seed(small_config(), 2).unwrap();
    let summary = trainer.run_episode().unwrap();

    assert_eq!(summary.episode, 1);
    assert!(summary.steps >= 1 && summary.steps <= 20);
    if summary.truncated {
        assert_eq!(summary.steps, 20);
        assert!(trainer.env().is_truncated());
    }
    assert_eq!(trainer.context().global_step, summary.steps as u64);
}

#[test]
fn test_training_runs_gradient_steps_and_syncs() {
    let mut trainer = Trainer::with_seed(small_config(), 3).unwrap();
    trainer.train(6).unwrap();

    let context = trainer.context();
    assert_eq!(context.episode, 6);
    // train_every is 1, so every tick after warm-up trains
    let agent = trainer.agent(AgentId::One);
    let expected = (context.global_step as usize).saturating_sub(7);
    assert_eq!(agent.train_steps, expected);
    assert_eq!(context.histories[0].episode_count(), 6);
}

#[test]
fn test_observer_sees_every_frame() {
    let mut trainer = Trainer::with_seed(small_config(), 4).unwrap();
    let mut frames = 0;
    let summary = trainer.run_episode_with(|_| frames += 1).unwrap();
    assert_eq!(frames, summary.steps + 1);
}

#[test]
fn test_log_lines_follow_cadence() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("log.csv");
    let mut trainer = Trainer::with_seed(small_config(), 5)
        .unwrap()
        .with_log(&log_path)
        .unwrap();

    // log_every is 2: episodes 2, 4 and the final 5
    trainer.train(5).unwrap();

    let text = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], LOG_HEADER);
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("2,"));
    assert!(lines[3].starts_with("5,"));
    let fields: Vec<&str> = lines[3].split(',').collect();
    assert_eq!(fields.len(), 5);
    // Averages carry exactly two decimals
    for average in &fields[3..] {
        let decimals = average.split('.').nth(1).unwrap();
        assert_eq!(decimals.len(), 2, "line {:?}", lines[3]);
    }
}

#[test]
fn test_checkpoint_resume_restores_context() {
    let dir = tempdir().unwrap();
    let paths = CheckpointPaths::in_dir(dir.path());

    let mut first = Trainer::with_seed(small_config(), 6).unwrap();
    first.train(3).unwrap();
    first.save_checkpoint(&paths).unwrap();

    let mut second = Trainer::with_seed(small_config(), 99).unwrap();
    second.resume(&paths).unwrap();

    assert_eq!(second.context().epsilon, first.context().epsilon);
    assert_eq!(second.context().global_step, first.context().global_step);
    assert_eq!(second.context().episode, 3);
    assert_eq!(
        second.agent(AgentId::Two).q_network,
        first.agent(AgentId::Two).q_network
    );
    assert_eq!(
        second.agent(AgentId::One).memory().len(),
        first.agent(AgentId::One).memory().len()
    );
}

#[test]
fn test_resume_without_files_starts_fresh() {
    let dir = tempdir().unwrap();
    let paths = CheckpointPaths::in_dir(dir.path().join("empty"));
    let mut trainer = Trainer::with_seed(small_config(), 7).unwrap();
    trainer.resume(&paths).unwrap();

    assert_eq!(trainer.context().global_step, 0);
    assert_eq!(trainer.context().epsilon, [1.0, 1.0]);
}

/// Board large enough that no snake can crash within a dozen ticks.
fn roomy_config(training: TrainingConfig) -> SnakeConfig {
    SnakeConfig {
        game: GameConfig {
            width: 1600,
            height: 1200,
            start1: (400, 400),
            start_direction1: Direction::Right,
            start2: (1200, 800),
            start_direction2: Direction::Left,
            ..GameConfig::default()
        },
        rewards: RewardConfig::default(),
        training,
    }
}

#[test]
fn test_train_and_sync_cadences() {
    let training = TrainingConfig {
        batch_size: 2,
        train_every: 3,
        target_sync_every: 5,
        ..small_training_config()
    };
    let mut trainer = Trainer::with_seed(roomy_config(training), 8).unwrap();

    // Global steps 0..=3: step 0 is still warming up, step 3 trains
    for _ in 0..4 {
        trainer.tick().unwrap();
    }
    for id in AgentId::ALL {
        let agent = trainer.agent(id);
        assert_eq!(agent.train_steps, 1);
        assert_ne!(agent.q_network, agent.target_network);
    }

    // The fifth tick brings the counter to 5 and syncs without training
    trainer.tick().unwrap();
    for id in AgentId::ALL {
        let agent = trainer.agent(id);
        assert_eq!(agent.train_steps, 1);
        assert_eq!(agent.q_network, agent.target_network);
    }

    // Steps 6 and 9 train, the sync at 10 catches up again
    for _ in 0..7 {
        trainer.tick().unwrap();
    }
    assert_eq!(trainer.context().global_step, 12);
    for id in AgentId::ALL {
        let agent = trainer.agent(id);
        assert_eq!(agent.train_steps, 3);
        assert_eq!(agent.q_network, agent.target_network);
    }
}
