use snake_duel::{
    agent::DqnAgent,
    config::{GameConfig, RewardConfig, SnakeConfig, TrainingConfig},
    env::{AgentId, Environment, OBSERVATION_SIZE, NUM_ACTIONS},
    error::SnakeError,
    network::ValueEstimator,
    persistence::{reset_checkpoints, CheckpointPaths, ResetOutcome},
    replay_buffer::Transition,
    trainer::Trainer,
};
use ndarray::Array2;
use std::fs;
use tempfile::tempdir;

fn quick_config() -> SnakeConfig {
    SnakeConfig {
        game: GameConfig {
            max_episode_steps: 30,
            ..GameConfig::default()
        },
        rewards: RewardConfig::default(),
        training: TrainingConfig {
            hidden_layers: vec![32, 32],
            batch_size: 16,
            buffer_capacity: 200,
            train_every: 4,
            target_sync_every: 20,
            log_every: 5,
            ..TrainingConfig::default()
        },
    }
}

#[test]
fn test_end_to_end_training_with_checkpoints() {
    let dir = tempdir().unwrap();
    let paths = CheckpointPaths::in_dir(dir.path().join("checkpoints"));
    let log_path = dir.path().join("training_log.csv");

    let mut trainer = Trainer::with_seed(quick_config(), 2024)
        .unwrap()
        .with_log(&log_path)
        .unwrap();
    trainer.resume(&paths).unwrap();
    let summaries = trainer.train(10).unwrap();
    trainer.save_checkpoint(&paths).unwrap();

    assert_eq!(summaries.len(), 10);
    assert!(summaries.iter().all(|s| s.steps <= 30));
    for path in paths.all() {
        assert!(path.exists(), "{} was not written", path.display());
    }
    let log = fs::read_to_string(&log_path).unwrap();
    assert_eq!(log.lines().count(), 3);

    // A second run continues the schedule rather than restarting it
    let mut resumed = Trainer::with_seed(quick_config(), 1).unwrap();
    resumed.resume(&paths).unwrap();
    assert_eq!(resumed.context().episode, 10);
    assert_eq!(resumed.context().epsilon, trainer.context().epsilon);
    let observations = Array2::from_elem((4, OBSERVATION_SIZE), 0.5);
    assert_eq!(
        resumed.agent(AgentId::One).q_network.evaluate_batch(observations.view()),
        trainer.agent(AgentId::One).q_network.evaluate_batch(observations.view()),
    );

    let summary = resumed.run_episode().unwrap();
    assert_eq!(summary.episode, 11);
}

#[test]
fn test_corrupt_checkpoint_is_not_treated_as_absent() {
    let dir = tempdir().unwrap();
    let paths = CheckpointPaths::in_dir(dir.path());
    fs::write(&paths.models[0], b"definitely not a model").unwrap();

    let mut trainer = Trainer::with_seed(quick_config(), 3).unwrap();
    let err = trainer.resume(&paths).unwrap_err();
    assert!(matches!(
        err,
        SnakeError::CorruptFile { .. } | SnakeError::IncompatibleVersion { .. }
    ));
}

#[test]
fn test_reset_after_training_removes_everything() {
    let dir = tempdir().unwrap();
    let paths = CheckpointPaths::in_dir(dir.path());
    let mut trainer = Trainer::with_seed(quick_config(), 4).unwrap();
    trainer.train(1).unwrap();
    trainer.save_checkpoint(&paths).unwrap();

    let report = reset_checkpoints(&paths).unwrap();
    assert!(report.iter().all(|(_, outcome)| *outcome == ResetOutcome::Deleted));

    let again = reset_checkpoints(&paths).unwrap();
    assert!(again.iter().all(|(_, outcome)| *outcome == ResetOutcome::Absent));
}

#[test]
fn test_hand_driven_loop_with_separate_agents() {
    let config = quick_config();
    let mut env = Environment::with_seed(config.game.clone(), config.rewards.clone(), 8).unwrap();
    let mut agents = [
        DqnAgent::new(&config.training, OBSERVATION_SIZE, NUM_ACTIONS, 10).unwrap(),
        DqnAgent::new(&config.training, OBSERVATION_SIZE, NUM_ACTIONS, 11).unwrap(),
    ];

    let mut observations = env.reset();
    for _ in 0..config.game.max_episode_steps {
        let actions = [
            agents[0].act(observations[0].view(), 1.0).unwrap(),
            agents[1].act(observations[1].view(), 1.0).unwrap(),
        ];
        let outcomes = env.step(actions[0], actions[1]).unwrap();
        for (index, agent) in agents.iter_mut().enumerate() {
            agent
                .remember(Transition {
                    observation: observations[index].clone(),
                    action: actions[index],
                    reward: outcomes[index].reward,
                    next_observation: outcomes[index].observation.clone(),
                    done: outcomes[index].done,
                })
                .unwrap();
        }
        if outcomes[0].done {
            break;
        }
        observations = [outcomes[0].observation.clone(), outcomes[1].observation.clone()];
    }

    // Each agent only stores its own experience
    assert_eq!(agents[0].memory().len(), agents[1].memory().len());
    assert!(agents[0]
        .memory()
        .iter()
        .zip(agents[1].memory().iter())
        .all(|(a, b)| a.observation != b.observation));
}
