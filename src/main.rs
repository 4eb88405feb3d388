use crate::catalog::{RoleCatalog, RoleKey, builtin_catalog};
use crate::classifier::{
    ClassifierHandle, ClassifyError, OfflineClassifier, ResolutionResult, conclude,
};
use crate::matching::resolve_alias;
use crate::reveal::RevealPlugin;
use crate::session::{Session, setup_session};
use crate::ui::{AppState, BACKGROUND_COLOR, ScreenPlugin};
use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task, block_on, futures_lite::future};
use bevy_persistent::prelude::*;
use std::sync::Arc;

mod catalog;
mod classifier;
mod fonts;
mod matching;
mod reveal;
mod roast;
mod session;
mod ui;

fn main() {
    // a catalog that fails integrity checks is a build defect, die loudly
    let catalog = builtin_catalog();
    catalog
        .validate()
        .expect("role catalog failed startup validation");

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins.set(WindowPlugin {
            // setup window
            primary_window: Window {
                title: "THE LAYOFF ORACLE".to_string(),
                fit_canvas_to_parent: true, // make it fill on web
                ..default()
            }
            .into(),
            ..default()
        }),
    )
    .insert_resource(ClearColor(BACKGROUND_COLOR))
    .insert_resource(catalog)
    .insert_resource(ClassifierHandle(Arc::new(OfflineClassifier)))
    .insert_resource(setup_session())
    .add_plugins((ScreenPlugin, AnalysisPlugin, RevealPlugin))
    .add_systems(Startup, spawn_camera);

    app.run();
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((Camera2d, IsDefaultUiCamera));
}

/// Runs one resolution per trip through `Analyzing`: alias stage first,
/// then a single classifier attempt off the main schedule, then the local
/// fuzzy fallback. Whatever happens, the user ends up on the result
/// screen with a resolved role.
struct AnalysisPlugin;
impl Plugin for AnalysisPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::Analyzing), begin_analysis)
            .add_systems(
                Update,
                poll_classifier.run_if(in_state(AppState::Analyzing)),
            )
            // a verdict that lands after we've left this state is stale;
            // dropping the task entity makes sure it's never applied
            .add_systems(OnExit(AppState::Analyzing), drop_inflight_classification);
    }
}

#[derive(Component)]
struct ClassifyInFlight(Task<Result<RoleKey, ClassifyError>>);

fn begin_analysis(
    mut commands: Commands,
    catalog: Res<RoleCatalog>,
    classifier: Res<ClassifierHandle>,
    mut session: ResMut<Persistent<Session>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(input) = session.job_title.clone() else {
        warn!("entered analysis with no job title stored");
        next_state.set(AppState::Title);
        return;
    };

    // exact/alias hit skips the classifier and the fuzzy matcher entirely
    if let Some(role) = resolve_alias(&catalog, &input) {
        info!("alias hit: `{input}` -> `{role}`");
        let result = ResolutionResult::new(&catalog, role);
        finish_analysis(result, &mut session, &mut next_state);
        return;
    }

    let handle = classifier.0.clone();
    let task = AsyncComputeTaskPool::get().spawn(async move { handle.classify(&input) });
    commands.spawn(ClassifyInFlight(task));
}

fn poll_classifier(
    mut commands: Commands,
    mut in_flight: Query<(Entity, &mut ClassifyInFlight)>,
    catalog: Res<RoleCatalog>,
    mut session: ResMut<Persistent<Session>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for (entity, mut task) in &mut in_flight {
        let Some(verdict) = block_on(future::poll_once(&mut task.0)) else {
            continue;
        };
        commands.entity(entity).despawn();

        let input = session.job_title.clone().unwrap_or_default();
        let matched = conclude(&catalog, &input, verdict);
        info!("resolved `{input}` -> `{matched}`");
        let result = ResolutionResult::new(&catalog, matched);
        finish_analysis(result, &mut session, &mut next_state);
    }
}

fn finish_analysis(
    result: ResolutionResult,
    session: &mut Persistent<Session>,
    next_state: &mut NextState<AppState>,
) {
    session.resolution = Some(result);
    if let Err(err) = session.persist() {
        warn!("failed to persist session: {err}");
    }
    next_state.set(AppState::Result);
}

fn drop_inflight_classification(
    in_flight: Query<Entity, With<ClassifyInFlight>>,
    mut commands: Commands,
) {
    for entity in &in_flight {
        commands.entity(entity).despawn();
    }
}
