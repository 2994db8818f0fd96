use indexmap::IndexMap;
use tracing::{debug, error, info, trace, warn};

use crate::{
    Error,
    overlay::{
        ALL_PROCESSES, ControllerEvent, DEFAULT_EDGE_MARGIN, DrawContext, OverlayController,
        OverlayEdit, OverlayId, OverlayRecord, OverlayRow, PointerEvent, RenderableSurface,
        ScreenBounds, SurfaceFactory, SurfaceStyle, VisibilityChange, opacity_from_percent, paint,
        reconcile, should_show,
    },
    services::ForegroundProcessResolver,
    store::OverlayStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionOptions {
    pub edge_margin: i32,
    pub screen: ScreenBounds,
}

impl Default for CollectionOptions {
    fn default() -> Self {
        Self {
            edge_margin: DEFAULT_EDGE_MARGIN,
            screen: ScreenBounds::default(),
        }
    }
}

/// Show/hide calls issued by one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub shown: usize,
    pub hidden: usize,
}

struct OverlayEntry<S> {
    record: OverlayRecord,
    controller: OverlayController<S>,
}

/// Owns every overlay: the ordered record/controller pairs, the visibility
/// sweep, and persistence.
///
/// Entries are keyed by a stable [`OverlayId`]; the display index shown on
/// screen is the entry's position in insertion order plus one. Row arguments
/// are zero-based positions.
pub struct OverlayCollection<F: SurfaceFactory> {
    factory: F,
    store: Box<dyn OverlayStore + Send>,
    resolver: Box<dyn ForegroundProcessResolver + Send>,
    entries: IndexMap<OverlayId, OverlayEntry<F::Surface>>,
    next_id: u64,
    editing: bool,
    /// Overlay whose press paused the sweep, if any.
    suspended_by: Option<OverlayId>,
    options: CollectionOptions,
}

impl<F: SurfaceFactory> OverlayCollection<F> {
    pub fn new(
        factory: F,
        store: Box<dyn OverlayStore + Send>,
        resolver: Box<dyn ForegroundProcessResolver + Send>,
        options: CollectionOptions,
    ) -> Self {
        Self {
            factory,
            store,
            resolver,
            entries: IndexMap::new(),
            next_id: 0,
            editing: false,
            suspended_by: None,
            options,
        }
    }

    /// Create a surface for every stored record and apply the visibility
    /// policy once. A missing or unreadable store is not fatal: the
    /// collection simply starts empty.
    pub fn load(&mut self) -> Result<usize, Error> {
        let records = match self.store.load() {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "overlay store not found or corrupt, starting empty");
                Vec::new()
            }
        };

        let current = self.resolver.current_foreground_process_name();
        for record in records {
            let id = self.spawn(record)?;
            if let Some(entry) = self.entries.get_mut(&id) {
                Self::reconcile_entry(entry, current.as_deref())?;
            }
        }

        info!(count = self.entries.len(), "overlays loaded");
        Ok(self.entries.len())
    }

    /// Append a default overlay and show it. Returns its display index.
    pub fn add(&mut self) -> Result<usize, Error> {
        let id = self.spawn(OverlayRecord::default())?;
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.controller.surface_mut().show()?;
        }
        self.persist();

        let index = self.entries.len();
        info!(%id, index, "overlay added");
        Ok(index)
    }

    /// Remove the overlay at `row`. Does nothing when no row is selected or
    /// the row does not exist.
    pub fn delete(&mut self, row: Option<usize>) -> Result<bool, Error> {
        let Some(row) = row else {
            return Ok(false);
        };
        let Some((id, entry)) = self.entries.shift_remove_index(row) else {
            return Ok(false);
        };

        if self.suspended_by == Some(id) {
            // Its release will never arrive.
            self.suspended_by = None;
        }
        if let Err(e) = entry.controller.into_surface().destroy() {
            warn!(%id, error = %e, "failed to destroy overlay surface");
        }
        self.persist();

        // Everything after the removed row now carries a smaller label.
        for entry in self.entries.values_mut().skip(row) {
            entry.controller.surface_mut().request_redraw()?;
        }

        info!(%id, row, "overlay deleted");
        Ok(true)
    }

    /// Flip the active flag at `row` and re-evaluate its visibility now.
    /// Returns the new flag.
    pub fn toggle_active(&mut self, row: usize) -> Result<bool, Error> {
        let current = self.resolver.current_foreground_process_name();
        let entry = self.entry_at_mut(row)?;
        entry.record.active = !entry.record.active;
        let active = entry.record.active;
        Self::reconcile_entry(entry, current.as_deref())?;
        self.persist();

        debug!(row, active, "overlay active toggled");
        Ok(active)
    }

    /// Lock or unlock every overlay for direct manipulation.
    pub fn set_edit_mode(&mut self, editing: bool) -> Result<(), Error> {
        self.editing = editing;
        for entry in self.entries.values_mut() {
            entry.controller.set_edit_mode(editing)?;
        }
        if !editing {
            // Leaving edit mode drops any gesture, so nothing will resume
            // the sweep otherwise.
            self.suspended_by = None;
        }
        debug!(editing, "edit mode changed");
        Ok(())
    }

    /// Reconcile every surface with the policy for the current foreground
    /// process. Skipped entirely while a gesture is in progress.
    pub fn sweep(&mut self) -> Result<SweepReport, Error> {
        if self.suspended_by.is_some() {
            trace!("sweep suspended during gesture");
            return Ok(SweepReport::default());
        }

        let current = self.resolver.current_foreground_process_name();
        let mut report = SweepReport::default();
        for entry in self.entries.values_mut() {
            match Self::reconcile_entry(entry, current.as_deref())? {
                Some(VisibilityChange::Show) => report.shown += 1,
                Some(VisibilityChange::Hide) => report.hidden += 1,
                None => {}
            }
        }

        if report != SweepReport::default() {
            debug!(
                process = ?current,
                shown = report.shown,
                hidden = report.hidden,
                "visibility sweep"
            );
        }
        Ok(report)
    }

    /// Route pointer input from the windowing layer to the overlay's
    /// controller.
    pub fn dispatch_pointer(&mut self, id: OverlayId, event: PointerEvent) -> Result<(), Error> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(Error::OverlayNotFound(id))?;

        match entry.controller.handle_pointer(event)? {
            Some(ControllerEvent::GestureStarted) => self.suspended_by = Some(id),
            Some(ControllerEvent::GeometryChanged) => self.on_controller_changed(id)?,
            Some(ControllerEvent::GestureEnded) => {
                self.on_controller_changed(id)?;
                self.suspended_by = None;
            }
            None => {}
        }
        Ok(())
    }

    /// The windowing layer saw the surface change size on its own.
    pub fn on_surface_resized(&mut self, id: OverlayId) -> Result<(), Error> {
        let entry = self.entries.get(&id).ok_or(Error::OverlayNotFound(id))?;
        if entry.controller.surface_resized().is_some() {
            self.on_controller_changed(id)?;
        }
        Ok(())
    }

    /// Copy the live surface geometry into the record and persist.
    pub fn on_controller_changed(&mut self, id: OverlayId) -> Result<(), Error> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(Error::OverlayNotFound(id))?;
        entry.record.bounds = entry.controller.surface().bounds().clamped();
        self.persist();
        Ok(())
    }

    /// Apply one change from the editor panel to the overlay at `row`.
    pub fn apply_edit(&mut self, row: usize, edit: OverlayEdit) -> Result<(), Error> {
        let current = match edit {
            OverlayEdit::Process(_) => self.resolver.current_foreground_process_name(),
            _ => None,
        };
        let screen = self.options.screen;
        let entry = self.entry_at_mut(row)?;

        match edit {
            OverlayEdit::Geometry(bounds) => {
                entry.record.bounds = entry.controller.apply_bounds(screen.clamp(bounds))?;
            }
            OverlayEdit::OpacityPercent(percent) => {
                let opacity = opacity_from_percent(percent);
                entry.record.opacity = opacity;
                entry.controller.surface_mut().set_opacity(opacity)?;
            }
            OverlayEdit::Process(filter) => {
                entry.record.process = filter;
                Self::reconcile_entry(entry, current.as_deref())?;
            }
            OverlayEdit::Color(color) => {
                entry.record.color = color;
                entry.controller.surface_mut().request_redraw()?;
            }
            OverlayEdit::Border(border) => {
                entry.record.border = border;
                entry.controller.surface_mut().request_redraw()?;
            }
        }

        self.persist();
        Ok(())
    }

    /// Paint the overlay `id` into `ctx`, labelled with its display index.
    pub fn paint(&self, id: OverlayId, ctx: &mut dyn DrawContext) -> Result<(), Error> {
        let (row, _, entry) = self
            .entries
            .get_full(&id)
            .ok_or(Error::OverlayNotFound(id))?;
        let bounds = entry.controller.surface().bounds();
        paint(ctx, &entry.record, bounds.width, bounds.height, row + 1);
        Ok(())
    }

    /// Choices for the editor's process filter: `All` first, then every
    /// process with a visible window.
    pub fn process_choices(&mut self) -> Vec<String> {
        std::iter::once(ALL_PROCESSES.to_string())
            .chain(self.resolver.enumerate_visible_process_names())
            .collect()
    }

    pub fn rows(&self) -> Vec<OverlayRow> {
        self.entries
            .values()
            .enumerate()
            .map(|(row, entry)| OverlayRow::new(row + 1, &entry.record))
            .collect()
    }

    pub fn records(&self) -> Vec<OverlayRecord> {
        self.entries.values().map(|e| e.record.clone()).collect()
    }

    pub fn record(&self, row: usize) -> Option<&OverlayRecord> {
        self.entries.get_index(row).map(|(_, e)| &e.record)
    }

    pub fn id_at(&self, row: usize) -> Option<OverlayId> {
        self.entries.get_index(row).map(|(id, _)| *id)
    }

    /// 1-based position of `id`, as shown in its label.
    pub fn display_index(&self, id: OverlayId) -> Option<usize> {
        self.entries.get_index_of(&id).map(|row| row + 1)
    }

    pub fn surface(&self, id: OverlayId) -> Option<&F::Surface> {
        self.entries.get(&id).map(|e| e.controller.surface())
    }

    pub fn surface_mut(&mut self, id: OverlayId) -> Option<&mut F::Surface> {
        self.entries
            .get_mut(&id)
            .map(|e| e.controller.surface_mut())
    }

    pub fn ids(&self) -> Vec<OverlayId> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn is_sweep_suspended(&self) -> bool {
        self.suspended_by.is_some()
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    fn spawn(&mut self, record: OverlayRecord) -> Result<OverlayId, Error> {
        let id = OverlayId(self.next_id);
        self.next_id += 1;

        let style = SurfaceStyle {
            opacity: record.opacity,
            input_transparent: !self.editing,
        };
        let surface = self.factory.create(id, record.bounds, style)?;
        let mut controller = OverlayController::new(surface, self.options.edge_margin);
        controller.set_edit_mode(self.editing)?;

        self.entries.insert(id, OverlayEntry { record, controller });
        Ok(id)
    }

    fn entry_at_mut(&mut self, row: usize) -> Result<&mut OverlayEntry<F::Surface>, Error> {
        self.entries
            .get_index_mut(row)
            .map(|(_, entry)| entry)
            .ok_or(Error::RowOutOfRange(row))
    }

    fn reconcile_entry(
        entry: &mut OverlayEntry<F::Surface>,
        current: Option<&str>,
    ) -> Result<Option<VisibilityChange>, Error> {
        let surface = entry.controller.surface_mut();
        let change = reconcile(should_show(&entry.record, current), surface.is_visible());
        match change {
            Some(VisibilityChange::Show) => surface.show()?,
            Some(VisibilityChange::Hide) => surface.hide()?,
            None => {}
        }
        Ok(change)
    }

    /// Write the whole collection. Failures are logged, never propagated:
    /// a full disk must not take the event loop down.
    fn persist(&self) {
        if let Err(e) = self.store.save(&self.records()) {
            error!(error = %e, "failed to save overlays");
        }
    }
}
