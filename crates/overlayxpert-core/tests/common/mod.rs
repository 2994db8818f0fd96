#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use overlayxpert_core::{
    Bounds, CollectionOptions, CursorHint, Error, ForegroundProcessResolver, MemoryStore,
    OverlayCollection, OverlayId, OverlayRecord, OverlayStore, RenderableSurface, SurfaceFactory,
    SurfaceStyle,
};

/// Everything a fake surface has been told, readable after the surface has
/// moved into the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceState {
    pub bounds: Bounds,
    pub visible: bool,
    pub opacity: f64,
    pub input_transparent: bool,
    pub cursor: CursorHint,
    pub shows: usize,
    pub hides: usize,
    pub redraws: usize,
    pub destroyed: bool,
}

pub type Surfaces = Arc<Mutex<HashMap<OverlayId, SurfaceState>>>;

pub struct FakeSurface {
    id: OverlayId,
    surfaces: Surfaces,
}

impl FakeSurface {
    fn update(&self, f: impl FnOnce(&mut SurfaceState)) {
        let mut surfaces = self.surfaces.lock().unwrap();
        f(surfaces.get_mut(&self.id).unwrap());
    }

    fn read<T>(&self, f: impl FnOnce(&SurfaceState) -> T) -> T {
        f(&self.surfaces.lock().unwrap()[&self.id])
    }
}

impl RenderableSurface for FakeSurface {
    fn set_bounds(&mut self, bounds: Bounds) -> Result<(), Error> {
        self.update(|s| s.bounds = bounds);
        Ok(())
    }

    fn bounds(&self) -> Bounds {
        self.read(|s| s.bounds)
    }

    fn set_opacity(&mut self, opacity: f64) -> Result<(), Error> {
        self.update(|s| s.opacity = opacity);
        Ok(())
    }

    fn set_input_transparent(&mut self, transparent: bool) -> Result<(), Error> {
        self.update(|s| s.input_transparent = transparent);
        Ok(())
    }

    fn set_cursor(&mut self, cursor: CursorHint) -> Result<(), Error> {
        self.update(|s| s.cursor = cursor);
        Ok(())
    }

    fn show(&mut self) -> Result<(), Error> {
        self.update(|s| {
            s.visible = true;
            s.shows += 1;
        });
        Ok(())
    }

    fn hide(&mut self) -> Result<(), Error> {
        self.update(|s| {
            s.visible = false;
            s.hides += 1;
        });
        Ok(())
    }

    fn is_visible(&self) -> bool {
        self.read(|s| s.visible)
    }

    fn request_redraw(&mut self) -> Result<(), Error> {
        self.update(|s| s.redraws += 1);
        Ok(())
    }

    fn destroy(self) -> Result<(), Error> {
        self.update(|s| {
            s.visible = false;
            s.destroyed = true;
        });
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct FakeFactory {
    pub surfaces: Surfaces,
}

impl SurfaceFactory for FakeFactory {
    type Surface = FakeSurface;

    fn create(
        &mut self,
        id: OverlayId,
        bounds: Bounds,
        style: SurfaceStyle,
    ) -> Result<FakeSurface, Error> {
        self.surfaces.lock().unwrap().insert(
            id,
            SurfaceState {
                bounds,
                visible: false,
                opacity: style.opacity,
                input_transparent: style.input_transparent,
                cursor: CursorHint::Arrow,
                shows: 0,
                hides: 0,
                redraws: 0,
                destroyed: false,
            },
        );
        Ok(FakeSurface {
            id,
            surfaces: self.surfaces.clone(),
        })
    }
}

/// Resolver whose answers the test changes between sweeps.
#[derive(Default, Clone)]
pub struct ScriptedResolver {
    current: Arc<Mutex<Option<String>>>,
    visible: Arc<Mutex<BTreeSet<String>>>,
}

impl ScriptedResolver {
    pub fn focus(&self, name: &str) {
        *self.current.lock().unwrap() = Some(name.to_string());
    }

    pub fn focus_nothing(&self) {
        *self.current.lock().unwrap() = None;
    }

    pub fn set_visible(&self, names: &[&str]) {
        *self.visible.lock().unwrap() = names.iter().map(|n| n.to_string()).collect();
    }
}

impl ForegroundProcessResolver for ScriptedResolver {
    fn current_foreground_process_name(&mut self) -> Option<String> {
        self.current.lock().unwrap().clone()
    }

    fn enumerate_visible_process_names(&mut self) -> BTreeSet<String> {
        self.visible.lock().unwrap().clone()
    }
}

pub struct Harness {
    pub collection: OverlayCollection<FakeFactory>,
    pub surfaces: Surfaces,
    pub resolver: ScriptedResolver,
    pub store: MemoryStore,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    pub fn with_records(records: Vec<OverlayRecord>) -> Self {
        Self::with_store(MemoryStore::with_records(records))
    }

    pub fn with_store(store: MemoryStore) -> Self {
        let resolver = ScriptedResolver::default();
        let factory = FakeFactory::default();
        let surfaces = factory.surfaces.clone();
        let collection = OverlayCollection::new(
            factory,
            Box::new(store.clone()),
            Box::new(resolver.clone()),
            CollectionOptions::default(),
        );
        Self {
            collection,
            surfaces,
            resolver,
            store,
        }
    }

    pub fn with_backing_store(store: impl OverlayStore + Send + 'static) -> Self {
        let resolver = ScriptedResolver::default();
        let factory = FakeFactory::default();
        let surfaces = factory.surfaces.clone();
        let collection = OverlayCollection::new(
            factory,
            Box::new(store),
            Box::new(resolver.clone()),
            CollectionOptions::default(),
        );
        Self {
            collection,
            surfaces,
            resolver,
            store: MemoryStore::new(),
        }
    }

    pub fn surface(&self, row: usize) -> SurfaceState {
        let id = self.collection.id_at(row).unwrap();
        self.surfaces.lock().unwrap()[&id].clone()
    }

    pub fn saved(&self) -> Vec<OverlayRecord> {
        self.store.records().unwrap_or_default()
    }
}

pub fn record_for(process: &str) -> OverlayRecord {
    OverlayRecord {
        process: process.into(),
        ..OverlayRecord::default()
    }
}
