use scenehop::{App, Config, SceneLibrary, TransitionEvent, TransitionHandle, Vec3};
use std::env;

fn demo_library() -> SceneLibrary {
    let mut library = SceneLibrary::new().with_latency(3);

    library.register("Title", |hierarchy| {
        let root = hierarchy.spawn("Title", None);
        hierarchy.spawn("Logo", Some(root));
        let _ = hierarchy.add_initializer::<(), _>(root, |_: &()| log::info!("Title screen ready"));
    });

    library.register("Level1", |hierarchy| {
        let root = hierarchy.spawn("Level1", None);
        hierarchy.spawn_with(
            "Player",
            Some(root),
            scenehop::Transform::from_position(Vec3::new(0.0, 1.0, 0.0)),
        );
        let _ = hierarchy.add_initializer::<u32, _>(root, |lives: &u32| {
            log::info!("Level1 starting with {} lives", lives)
        });
    });

    // Delivered inside a container node, as some asset pipelines do
    library.register_with_latency("Level2", 8, |hierarchy| {
        let wrapper = hierarchy.spawn("Level2_Import", None);
        let root = hierarchy.spawn("Level2", Some(wrapper));
        hierarchy.spawn("Boss", Some(root));
        let _ = hierarchy.add_initializer::<u32, _>(root, |lives: &u32| {
            log::info!("Level2 starting with {} lives", lives)
        });
    });

    library
}

fn report(app: &mut App, handle: Option<TransitionHandle>) {
    let Some(handle) = handle else {
        log::warn!("Transition request ignored: controller busy");
        return;
    };

    let frames = app.wait_for(&handle);
    log::info!("{:?} after {} frames ({:?})", handle.status(), frames, handle.scene());
    log::info!("Hierarchy:\n{}", app.hierarchy);
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = match env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if config.controller.default_scene.is_none() {
        config.controller.default_scene = Some("Title".to_string());
    }

    let mut app = App::new(config, demo_library());
    app.controller.on_event(|event| {
        if let TransitionEvent::PhaseChanged { scene, phase } = event {
            log::debug!("{} -> {:?}", scene, phase);
        }
    });

    let handle = app.start();
    report(&mut app, handle);

    let handle = app.change_scene("Level1", 3u32);
    report(&mut app, handle);

    let handle = app.change_scene("Level2", 2u32);
    // Dropped: Level2 is still loading
    if app.change_scene("Title", ()).is_none() {
        log::info!("Second request rejected while Level2 loads");
    }
    report(&mut app, handle);

    let handle = app.change_scene("Level3", ());
    report(&mut app, handle);

    log::info!(
        "Finished at frame {} ({:.2}s), current scene {:?}",
        app.frame(),
        app.time(),
        app.controller.current_scene_name()
    );
    Ok(())
}
