//! Known D4RL datasets and the locations of their archives.
use crate::D4rlError;
use anyhow::Result;

const BASE_URL: &str = "http://rail.eecs.berkeley.edu/datasets/offline_rl/";

/// Dataset identifiers and archive paths relative to [`BASE_URL`].
const D4RL_DATASETS: &[(&str, &str)] = &[
    ("maze2d-open-v0", "maze2d/maze2d-open-sparse.hdf5"),
    ("maze2d-umaze-v1", "maze2d/maze2d-umaze-sparse-v1.hdf5"),
    ("maze2d-medium-v1", "maze2d/maze2d-medium-sparse-v1.hdf5"),
    ("maze2d-large-v1", "maze2d/maze2d-large-sparse-v1.hdf5"),
    ("maze2d-eval-umaze-v1", "maze2d/maze2d-eval-umaze-sparse-v1.hdf5"),
    ("maze2d-eval-medium-v1", "maze2d/maze2d-eval-medium-sparse-v1.hdf5"),
    ("maze2d-eval-large-v1", "maze2d/maze2d-eval-large-sparse-v1.hdf5"),
    ("maze2d-open-dense-v0", "maze2d/maze2d-open-dense.hdf5"),
    ("maze2d-umaze-dense-v1", "maze2d/maze2d-umaze-dense-v1.hdf5"),
    ("maze2d-medium-dense-v1", "maze2d/maze2d-medium-dense-v1.hdf5"),
    ("maze2d-large-dense-v1", "maze2d/maze2d-large-dense-v1.hdf5"),
    ("maze2d-eval-umaze-dense-v1", "maze2d/maze2d-eval-umaze-dense-v1.hdf5"),
    ("maze2d-eval-medium-dense-v1", "maze2d/maze2d-eval-medium-dense-v1.hdf5"),
    ("maze2d-eval-large-dense-v1", "maze2d/maze2d-eval-large-dense-v1.hdf5"),
    ("minigrid-fourrooms-v0", "minigrid/minigrid4rooms.hdf5"),
    ("minigrid-fourrooms-random-v0", "minigrid/minigrid4rooms_random.hdf5"),
    ("pen-human-v0", "hand_dapg/pen-v0_demos_clipped.hdf5"),
    ("pen-cloned-v0", "hand_dapg/pen-demos-v0-bc-combined.hdf5"),
    ("pen-expert-v0", "hand_dapg/pen-v0_expert_clipped.hdf5"),
    ("hammer-human-v0", "hand_dapg/hammer-v0_demos_clipped.hdf5"),
    ("hammer-cloned-v0", "hand_dapg/hammer-demos-v0-bc-combined.hdf5"),
    ("hammer-expert-v0", "hand_dapg/hammer-v0_expert_clipped.hdf5"),
    ("relocate-human-v0", "hand_dapg/relocate-v0_demos_clipped.hdf5"),
    ("relocate-cloned-v0", "hand_dapg/relocate-demos-v0-bc-combined.hdf5"),
    ("relocate-expert-v0", "hand_dapg/relocate-v0_expert_clipped.hdf5"),
    ("door-human-v0", "hand_dapg/door-v0_demos_clipped.hdf5"),
    ("door-cloned-v0", "hand_dapg/door-demos-v0-bc-combined.hdf5"),
    ("door-expert-v0", "hand_dapg/door-v0_expert_clipped.hdf5"),
    ("halfcheetah-random-v0", "gym_mujoco/halfcheetah_random.hdf5"),
    ("halfcheetah-medium-v0", "gym_mujoco/halfcheetah_medium.hdf5"),
    ("halfcheetah-expert-v0", "gym_mujoco/halfcheetah_expert.hdf5"),
    ("halfcheetah-medium-replay-v0", "gym_mujoco/halfcheetah_mixed.hdf5"),
    ("halfcheetah-medium-expert-v0", "gym_mujoco/halfcheetah_medium_expert.hdf5"),
    ("walker2d-random-v0", "gym_mujoco/walker2d_random.hdf5"),
    ("walker2d-medium-v0", "gym_mujoco/walker2d_medium.hdf5"),
    ("walker2d-expert-v0", "gym_mujoco/walker2d_expert.hdf5"),
    ("walker2d-medium-replay-v0", "gym_mujoco/walker_mixed.hdf5"),
    ("walker2d-medium-expert-v0", "gym_mujoco/walker2d_medium_expert.hdf5"),
    ("hopper-random-v0", "gym_mujoco/hopper_random.hdf5"),
    ("hopper-medium-v0", "gym_mujoco/hopper_medium.hdf5"),
    ("hopper-expert-v0", "gym_mujoco/hopper_expert.hdf5"),
    ("hopper-medium-replay-v0", "gym_mujoco/hopper_mixed.hdf5"),
    ("hopper-medium-expert-v0", "gym_mujoco/hopper_medium_expert.hdf5"),
    ("ant-random-v0", "gym_mujoco/ant_random.hdf5"),
    ("ant-medium-v0", "gym_mujoco/ant_medium.hdf5"),
    ("ant-expert-v0", "gym_mujoco/ant_expert.hdf5"),
    ("ant-medium-replay-v0", "gym_mujoco/ant_mixed.hdf5"),
    ("ant-medium-expert-v0", "gym_mujoco/ant_medium_expert.hdf5"),
    ("ant-random-expert-v0", "gym_mujoco/ant_random_expert.hdf5"),
    ("antmaze-umaze-v0", "ant_maze_new/Ant_maze_u-maze_noisy_multistart_False_multigoal_False_sparse.hdf5"),
    ("antmaze-umaze-diverse-v0", "ant_maze_new/Ant_maze_u-maze_noisy_multistart_True_multigoal_True_sparse.hdf5"),
    ("antmaze-medium-play-v0", "ant_maze_new/Ant_maze_big-maze_noisy_multistart_True_multigoal_False_sparse.hdf5"),
    ("antmaze-medium-diverse-v0", "ant_maze_new/Ant_maze_big-maze_noisy_multistart_True_multigoal_True_sparse.hdf5"),
    ("antmaze-large-play-v0", "ant_maze_new/Ant_maze_hardest-maze_noisy_multistart_True_multigoal_False_sparse.hdf5"),
    ("antmaze-large-diverse-v0", "ant_maze_new/Ant_maze_hardest-maze_noisy_multistart_True_multigoal_True_sparse.hdf5"),
    ("antmaze-umaze-v2", "ant_maze_v2/Ant_maze_u-maze_noisy_multistart_False_multigoal_False_sparse_fixed.hdf5"),
    ("antmaze-umaze-diverse-v2", "ant_maze_v2/Ant_maze_u-maze_noisy_multistart_True_multigoal_True_sparse_fixed.hdf5"),
    ("antmaze-medium-play-v2", "ant_maze_v2/Ant_maze_big-maze_noisy_multistart_True_multigoal_False_sparse_fixed.hdf5"),
    ("antmaze-medium-diverse-v2", "ant_maze_v2/Ant_maze_big-maze_noisy_multistart_True_multigoal_True_sparse_fixed.hdf5"),
    ("antmaze-large-play-v2", "ant_maze_v2/Ant_maze_hardest-maze_noisy_multistart_True_multigoal_False_sparse_fixed.hdf5"),
    ("antmaze-large-diverse-v2", "ant_maze_v2/Ant_maze_hardest-maze_noisy_multistart_True_multigoal_True_sparse_fixed.hdf5"),
    ("flow-ring-random-v0", "flow/flow-ring-v0-random.hdf5"),
    ("flow-ring-controller-v0", "flow/flow-ring-v0-idm.hdf5"),
    ("flow-merge-random-v0", "flow/flow-merge-v0-random.hdf5"),
    ("flow-merge-controller-v0", "flow/flow-merge-v0-idm.hdf5"),
    ("kitchen-complete-v0", "kitchen/mini_kitchen_microwave_kettle_light_slider-v0.hdf5"),
    ("kitchen-partial-v0", "kitchen/kitchen_microwave_kettle_light_slider-v0.hdf5"),
    ("kitchen-mixed-v0", "kitchen/kitchen_microwave_kettle_bottomburner_light-v0.hdf5"),
    ("carla-lane-v0", "carla/carla_lane_follow_flat-v0.hdf5"),
    ("carla-town-v0", "carla/carla_town_subsamp_flat-v0.hdf5"),
    ("carla-town-full-v0", "carla/carla_town_flat-v0.hdf5"),
    ("bullet-halfcheetah-random-v0", "bullet/bullet-halfcheetah_random.hdf5"),
    ("bullet-halfcheetah-medium-v0", "bullet/bullet-halfcheetah_medium.hdf5"),
    ("bullet-halfcheetah-expert-v0", "bullet/bullet-halfcheetah_expert.hdf5"),
    ("bullet-halfcheetah-medium-expert-v0", "bullet/bullet-halfcheetah_medium_expert.hdf5"),
    ("bullet-halfcheetah-medium-replay-v0", "bullet/bullet-halfcheetah_medium_replay.hdf5"),
    ("bullet-hopper-random-v0", "bullet/bullet-hopper_random.hdf5"),
    ("bullet-hopper-medium-v0", "bullet/bullet-hopper_medium.hdf5"),
    ("bullet-hopper-expert-v0", "bullet/bullet-hopper_expert.hdf5"),
    ("bullet-hopper-medium-expert-v0", "bullet/bullet-hopper_medium_expert.hdf5"),
    ("bullet-hopper-medium-replay-v0", "bullet/bullet-hopper_medium_replay.hdf5"),
    ("bullet-ant-random-v0", "bullet/bullet-ant_random.hdf5"),
    ("bullet-ant-medium-v0", "bullet/bullet-ant_medium.hdf5"),
    ("bullet-ant-expert-v0", "bullet/bullet-ant_expert.hdf5"),
    ("bullet-ant-medium-expert-v0", "bullet/bullet-ant_medium_expert.hdf5"),
    ("bullet-ant-medium-replay-v0", "bullet/bullet-ant_medium_replay.hdf5"),
    ("bullet-walker2d-random-v0", "bullet/bullet-walker2d_random.hdf5"),
    ("bullet-walker2d-medium-v0", "bullet/bullet-walker2d_medium.hdf5"),
    ("bullet-walker2d-expert-v0", "bullet/bullet-walker2d_expert.hdf5"),
    ("bullet-walker2d-medium-expert-v0", "bullet/bullet-walker2d_medium_expert.hdf5"),
    ("bullet-walker2d-medium-replay-v0", "bullet/bullet-walker2d_medium_replay.hdf5"),
    ("bullet-maze2d-open-v0", "bullet/bullet-maze2d-open-sparse.hdf5"),
    ("bullet-maze2d-umaze-v0", "bullet/bullet-maze2d-umaze-sparse.hdf5"),
    ("bullet-maze2d-medium-v0", "bullet/bullet-maze2d-medium-sparse.hdf5"),
    ("bullet-maze2d-large-v0", "bullet/bullet-maze2d-large-sparse.hdf5"),
    ("halfcheetah-random-v1", "gym_mujoco_v1/halfcheetah_random-v1.hdf5"),
    ("halfcheetah-random-v2", "gym_mujoco_v2/halfcheetah_random-v2.hdf5"),
    ("halfcheetah-medium-v1", "gym_mujoco_v1/halfcheetah_medium-v1.hdf5"),
    ("halfcheetah-medium-v2", "gym_mujoco_v2/halfcheetah_medium-v2.hdf5"),
    ("halfcheetah-expert-v1", "gym_mujoco_v1/halfcheetah_expert-v1.hdf5"),
    ("halfcheetah-expert-v2", "gym_mujoco_v2/halfcheetah_expert-v2.hdf5"),
    ("halfcheetah-medium-replay-v1", "gym_mujoco_v1/halfcheetah_medium_replay-v1.hdf5"),
    ("halfcheetah-medium-replay-v2", "gym_mujoco_v2/halfcheetah_medium_replay-v2.hdf5"),
    ("halfcheetah-full-replay-v1", "gym_mujoco_v1/halfcheetah_full_replay-v1.hdf5"),
    ("halfcheetah-full-replay-v2", "gym_mujoco_v2/halfcheetah_full_replay-v2.hdf5"),
    ("halfcheetah-medium-expert-v1", "gym_mujoco_v1/halfcheetah_medium_expert-v1.hdf5"),
    ("halfcheetah-medium-expert-v2", "gym_mujoco_v2/halfcheetah_medium_expert-v2.hdf5"),
    ("hopper-random-v1", "gym_mujoco_v1/hopper_random-v1.hdf5"),
    ("hopper-random-v2", "gym_mujoco_v2/hopper_random-v2.hdf5"),
    ("hopper-medium-v1", "gym_mujoco_v1/hopper_medium-v1.hdf5"),
    ("hopper-medium-v2", "gym_mujoco_v2/hopper_medium-v2.hdf5"),
    ("hopper-expert-v1", "gym_mujoco_v1/hopper_expert-v1.hdf5"),
    ("hopper-expert-v2", "gym_mujoco_v2/hopper_expert-v2.hdf5"),
    ("hopper-medium-replay-v1", "gym_mujoco_v1/hopper_medium_replay-v1.hdf5"),
    ("hopper-medium-replay-v2", "gym_mujoco_v2/hopper_medium_replay-v2.hdf5"),
    ("hopper-full-replay-v1", "gym_mujoco_v1/hopper_full_replay-v1.hdf5"),
    ("hopper-full-replay-v2", "gym_mujoco_v2/hopper_full_replay-v2.hdf5"),
    ("hopper-medium-expert-v1", "gym_mujoco_v1/hopper_medium_expert-v1.hdf5"),
    ("hopper-medium-expert-v2", "gym_mujoco_v2/hopper_medium_expert-v2.hdf5"),
    ("walker2d-random-v1", "gym_mujoco_v1/walker2d_random-v1.hdf5"),
    ("walker2d-random-v2", "gym_mujoco_v2/walker2d_random-v2.hdf5"),
    ("walker2d-medium-v1", "gym_mujoco_v1/walker2d_medium-v1.hdf5"),
    ("walker2d-medium-v2", "gym_mujoco_v2/walker2d_medium-v2.hdf5"),
    ("walker2d-expert-v1", "gym_mujoco_v1/walker2d_expert-v1.hdf5"),
    ("walker2d-expert-v2", "gym_mujoco_v2/walker2d_expert-v2.hdf5"),
    ("walker2d-medium-replay-v1", "gym_mujoco_v1/walker2d_medium_replay-v1.hdf5"),
    ("walker2d-medium-replay-v2", "gym_mujoco_v2/walker2d_medium_replay-v2.hdf5"),
    ("walker2d-full-replay-v1", "gym_mujoco_v1/walker2d_full_replay-v1.hdf5"),
    ("walker2d-full-replay-v2", "gym_mujoco_v2/walker2d_full_replay-v2.hdf5"),
    ("walker2d-medium-expert-v1", "gym_mujoco_v1/walker2d_medium_expert-v1.hdf5"),
    ("walker2d-medium-expert-v2", "gym_mujoco_v2/walker2d_medium_expert-v2.hdf5"),
    ("ant-random-v1", "gym_mujoco_v1/ant_random-v1.hdf5"),
    ("ant-random-v2", "gym_mujoco_v2/ant_random-v2.hdf5"),
    ("ant-medium-v1", "gym_mujoco_v1/ant_medium-v1.hdf5"),
    ("ant-medium-v2", "gym_mujoco_v2/ant_medium-v2.hdf5"),
    ("ant-expert-v1", "gym_mujoco_v1/ant_expert-v1.hdf5"),
    ("ant-expert-v2", "gym_mujoco_v2/ant_expert-v2.hdf5"),
    ("ant-medium-replay-v1", "gym_mujoco_v1/ant_medium_replay-v1.hdf5"),
    ("ant-medium-replay-v2", "gym_mujoco_v2/ant_medium_replay-v2.hdf5"),
    ("ant-full-replay-v1", "gym_mujoco_v1/ant_full_replay-v1.hdf5"),
    ("ant-full-replay-v2", "gym_mujoco_v2/ant_full_replay-v2.hdf5"),
    ("ant-medium-expert-v1", "gym_mujoco_v1/ant_medium_expert-v1.hdf5"),
    ("ant-medium-expert-v2", "gym_mujoco_v2/ant_medium_expert-v2.hdf5"),
    ("hammer-human-v1", "hand_dapg_v1/hammer-human-v1.hdf5"),
    ("hammer-expert-v1", "hand_dapg_v1/hammer-expert-v1.hdf5"),
    ("hammer-cloned-v1", "hand_dapg_v1/hammer-cloned-v1.hdf5"),
    ("pen-human-v1", "hand_dapg_v1/pen-human-v1.hdf5"),
    ("pen-expert-v1", "hand_dapg_v1/pen-expert-v1.hdf5"),
    ("pen-cloned-v1", "hand_dapg_v1/pen-cloned-v1.hdf5"),
    ("relocate-human-v1", "hand_dapg_v1/relocate-human-v1.hdf5"),
    ("relocate-expert-v1", "hand_dapg_v1/relocate-expert-v1.hdf5"),
    ("relocate-cloned-v1", "hand_dapg_v1/relocate-cloned-v1.hdf5"),
    ("door-human-v1", "hand_dapg_v1/door-human-v1.hdf5"),
    ("door-expert-v1", "hand_dapg_v1/door-expert-v1.hdf5"),
    ("door-cloned-v1", "hand_dapg_v1/door-cloned-v1.hdf5"),
    ("antmaze-umaze-v1", "ant_maze_v1/Ant_maze_umaze_noisy_multistart_False_multigoal_False_sparse.hdf5"),
    ("antmaze-umaze-diverse-v1", "ant_maze_v1/Ant_maze_umaze_noisy_multistart_True_multigoal_True_sparse.hdf5"),
    ("antmaze-medium-play-v1", "ant_maze_v1/Ant_maze_medium_noisy_multistart_True_multigoal_False_sparse.hdf5"),
    ("antmaze-medium-diverse-v1", "ant_maze_v1/Ant_maze_medium_noisy_multistart_True_multigoal_True_sparse.hdf5"),
    ("antmaze-large-diverse-v1", "ant_maze_v1/Ant_maze_large_noisy_multistart_True_multigoal_True_sparse.hdf5"),
    ("antmaze-large-play-v1", "ant_maze_v1/Ant_maze_large_noisy_multistart_True_multigoal_False_sparse.hdf5"),
    ("antmaze-eval-umaze-v0", "ant_maze_new/Ant_maze_umaze_eval_noisy_multistart_True_multigoal_False_sparse.hdf5"),
    ("antmaze-eval-umaze-diverse-v0", "ant_maze_new/Ant_maze_umaze_eval_noisy_multistart_True_multigoal_True_sparse.hdf5"),
    ("antmaze-eval-medium-play-v0", "ant_maze_new/Ant_maze_medium_eval_noisy_multistart_True_multigoal_True_sparse.hdf5"),
    ("antmaze-eval-medium-diverse-v0", "ant_maze_new/Ant_maze_medium_eval_noisy_multistart_True_multigoal_False_sparse.hdf5"),
    ("antmaze-eval-large-diverse-v0", "ant_maze_new/Ant_maze_large_eval_noisy_multistart_True_multigoal_False_sparse.hdf5"),
    ("antmaze-eval-large-play-v0", "ant_maze_new/Ant_maze_large_eval_noisy_multistart_True_multigoal_True_sparse.hdf5"),
    ("door-human-longhorizon-v0", "hand_dapg/door-v0_demos_clipped.hdf5"),
    ("hammer-human-longhorizon-v0", "hand_dapg/hammer-v0_demos_clipped.hdf5"),
    ("pen-human-longhorizon-v0", "hand_dapg/pen-v0_demos_clipped.hdf5"),
    ("relocate-human-longhorizon-v0", "hand_dapg/relocate-v0_demos_clipped.hdf5"),
    ("maze2d-umaze-v0", "maze2d/maze2d-umaze-sparse.hdf5"),
    ("maze2d-medium-v0", "maze2d/maze2d-medium-sparse.hdf5"),
    ("maze2d-large-v0", "maze2d/maze2d-large-sparse.hdf5"),
    ("maze2d-umaze-dense-v0", "maze2d/maze2d-umaze-dense.hdf5"),
    ("maze2d-medium-dense-v0", "maze2d/maze2d-medium-dense.hdf5"),
    ("maze2d-large-dense-v0", "maze2d/maze2d-large-dense.hdf5"),
    ("carla-lane-render-v0", "carla/carla_lane_follow-v0.hdf5"),
    ("carla-town-render-v0", "carla/carla_town_flat-v0.hdf5"),
];

/// Returns the archive URL of a dataset.
pub fn dataset_url(name: &str) -> Result<String> {
    D4RL_DATASETS
        .iter()
        .find(|(id, _)| *id == name)
        .map(|(_, path)| format!("{}{}", BASE_URL, path))
        .ok_or_else(|| D4rlError::UnknownDatasetError(name.to_string()).into())
}

/// Identifiers of all known datasets.
pub fn dataset_names() -> impl Iterator<Item = &'static str> {
    D4RL_DATASETS.iter().map(|(id, _)| *id)
}
