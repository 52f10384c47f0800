//! Route table and the views mounted by it.
//!
//! Every view draws once on mount, subscribes to the slices it shows so it
//! redraws on change, schedules the loads it needs, and unsubscribes again
//! in its cleanup.

use std::rc::Rc;

use timetrack_router::memory::MemoryOutlet;
use timetrack_router::{Mount, RenderError, Routes};
use timetrack_store::{listener, ResourceKey, Store};

use crate::context::ViewContext;
use crate::render;

pub const HOME: &str = "/";
pub const USERS: &str = "/users";
pub const ACTIVITIES: &str = "/activities";
pub const TRACKS: &str = "/tracks";
pub const RECAP: &str = "/recap";

/// All navigable paths, in menu order.
pub const NAV_LINKS: [&str; 5] = [HOME, USERS, ACTIVITIES, TRACKS, RECAP];

type Draw = dyn Fn(&Store) -> Vec<String>;

/// Mount a view that shows `keys` and redraws through `draw`.
fn mount(
    context: &ViewContext,
    outlet: &MemoryOutlet,
    keys: &'static [ResourceKey],
    draw: Rc<Draw>,
) -> Mount {
    let redraw = {
        let store = context.store().clone();
        let outlet = outlet.clone();
        move || outlet.set_lines(draw(&store))
    };
    redraw();

    let on_change = listener(move |_| redraw());
    for key in keys {
        context.store().subscribe(*key, &on_change);
    }

    let store = context.store().clone();
    Mount::cleanup(move || {
        for key in keys {
            store.unsubscribe(*key, &on_change);
        }
    })
}

fn home(context: &ViewContext, outlet: &MemoryOutlet) -> Result<Mount, RenderError> {
    let query = context.selection().track_query();
    let store = context.store().clone();
    context.spawn(async move {
        store.load_users(false).await;
        store.load_activities(false).await;
        store.load_tracks(query, false).await;
    });
    Ok(mount(
        context,
        outlet,
        &[ResourceKey::Users, ResourceKey::Activities, ResourceKey::Tracks],
        Rc::new(render::dashboard),
    ))
}

fn users(context: &ViewContext, outlet: &MemoryOutlet) -> Result<Mount, RenderError> {
    let store = context.store().clone();
    context.spawn(async move { store.load_users(false).await });
    Ok(mount(
        context,
        outlet,
        &[ResourceKey::Users],
        Rc::new(|store: &Store| render::entity_list("Users", &store.users())),
    ))
}

fn activities(context: &ViewContext, outlet: &MemoryOutlet) -> Result<Mount, RenderError> {
    let store = context.store().clone();
    context.spawn(async move { store.load_activities(false).await });
    Ok(mount(
        context,
        outlet,
        &[ResourceKey::Activities],
        Rc::new(|store: &Store| render::entity_list("Activities", &store.activities())),
    ))
}

/// Tracks also need users and activities to name the track's owners.
fn tracks(context: &ViewContext, outlet: &MemoryOutlet) -> Result<Mount, RenderError> {
    let query = context.selection().track_query();
    let store = context.store().clone();
    context.spawn(async move {
        store.load_tracks(query, false).await;
        store.load_users(false).await;
        store.load_activities(false).await;
    });
    Ok(mount(
        context,
        outlet,
        &[ResourceKey::Tracks, ResourceKey::Users, ResourceKey::Activities],
        Rc::new(|store: &Store| render::tracks(store, &store.tracks())),
    ))
}

fn recap(context: &ViewContext, outlet: &MemoryOutlet) -> Result<Mount, RenderError> {
    let query = context.selection().recap_query();
    let store = context.store().clone();
    context.spawn(async move { store.load_recap(query).await });
    Ok(mount(
        context,
        outlet,
        &[ResourceKey::Recap],
        Rc::new(|store: &Store| render::recap(&store.recap())),
    ))
}

/// The app's route table.
pub fn routes(context: &ViewContext) -> Routes<MemoryOutlet> {
    type View = fn(&ViewContext, &MemoryOutlet) -> Result<Mount, RenderError>;
    let views: [(&str, View); 5] = [
        (HOME, home),
        (USERS, users),
        (ACTIVITIES, activities),
        (TRACKS, tracks),
        (RECAP, recap),
    ];

    let mut routes = Routes::new();
    for (path, view) in views {
        let context = context.clone();
        routes.insert(path, move |outlet: &MemoryOutlet| view(&context, outlet));
    }
    routes
}
