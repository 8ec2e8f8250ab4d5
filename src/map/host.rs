use crate::config::AppConfig;
use crate::data::{spawn_boundary_load, BoundaryData, BoundaryError};
use crate::districts::DistrictTable;
use crate::map::projection::Viewport;
use crate::map::renderer::MapRenderer;
use crate::marker::MarkerLayer;
use std::sync::mpsc::{Receiver, TryRecvError};
use tracing::{error, info, warn};

/// Progress of the boundary overlay for the current instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryStatus {
    Disabled,
    Loading,
    Loaded,
    Failed,
}

impl BoundaryStatus {
    pub fn label(self) -> &'static str {
        match self {
            BoundaryStatus::Disabled => "off",
            BoundaryStatus::Loading => "loading",
            BoundaryStatus::Loaded => "loaded",
            BoundaryStatus::Failed => "unavailable",
        }
    }
}

/// A live map: view, layers and markers for one mount
pub struct MapInstance {
    pub viewport: Viewport,
    pub renderer: MapRenderer,
    pub markers: MarkerLayer,
    boundary_rx: Option<Receiver<Result<BoundaryData, BoundaryError>>>,
    boundary_status: BoundaryStatus,
    unmatched: Vec<String>,
}

impl MapInstance {
    pub fn boundary_status(&self) -> BoundaryStatus {
        self.boundary_status
    }

    /// Marker districts with no feature of the same name in the loaded boundary
    pub fn unmatched_districts(&self) -> &[String] {
        &self.unmatched
    }

    /// Pull in a finished boundary load, if any. Failures are logged and
    /// leave the map with markers only.
    pub fn poll_boundary(&mut self) -> BoundaryStatus {
        let Some(rx) = &self.boundary_rx else {
            return self.boundary_status;
        };

        match rx.try_recv() {
            Ok(Ok(data)) => {
                self.unmatched = self
                    .markers
                    .markers()
                    .iter()
                    .filter(|m| data.find(&m.district).is_none())
                    .map(|m| m.district.clone())
                    .collect();
                if !self.unmatched.is_empty() {
                    warn!(districts = ?self.unmatched, "no boundary feature for districts");
                }
                self.renderer.set_boundary(data);
                self.boundary_status = BoundaryStatus::Loaded;
                self.boundary_rx = None;
            }
            Ok(Err(e)) => {
                error!(error = %e, cause = ?std::error::Error::source(&e), "error loading boundary GeoJSON");
                self.boundary_status = BoundaryStatus::Failed;
                self.boundary_rx = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                error!("boundary loader exited without a result");
                self.boundary_status = BoundaryStatus::Failed;
                self.boundary_rx = None;
            }
        }
        self.boundary_status
    }
}

/// Owns at most one [`MapInstance`]. Mounting is idempotent and the
/// instance is released on unmount and on drop.
pub struct MapHost {
    config: AppConfig,
    table: DistrictTable,
    instance: Option<MapInstance>,
    created: u64,
}

impl MapHost {
    pub fn new(config: AppConfig, table: DistrictTable) -> Self {
        Self {
            config,
            table,
            instance: None,
            created: 0,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn table(&self) -> &DistrictTable {
        &self.table
    }

    /// Create the map for a canvas of `width` x `height` dots, or return the
    /// existing one untouched.
    pub fn mount(&mut self, width: usize, height: usize) -> &mut MapInstance {
        let instance = match self.instance.take() {
            Some(existing) => existing,
            None => {
                self.created += 1;
                self.create(width, height)
            }
        };
        self.instance.insert(instance)
    }

    fn create(&self, width: usize, height: usize) -> MapInstance {
        let view = &self.config.view;
        let viewport = Viewport::new(view.center.0, view.center.1, view.zoom, view.tile_size, width, height);
        let mut renderer = MapRenderer::new(view.background, self.config.boundary.clone());
        renderer.settings.show_names = self.config.markers.show_names;
        info!(
            center = ?view.center,
            zoom = view.zoom,
            generation = self.created,
            "map mounted"
        );

        // Map is ready: start the overlay in the background, build markers now
        let (boundary_rx, boundary_status) = if self.config.boundary.enabled {
            let rx = spawn_boundary_load(self.config.boundary.path.clone());
            (Some(rx), BoundaryStatus::Loading)
        } else {
            (None, BoundaryStatus::Disabled)
        };

        let markers = MarkerLayer::build(&self.table, &self.config.markers, view.background);

        MapInstance {
            viewport,
            renderer,
            markers,
            boundary_rx,
            boundary_status,
            unmatched: Vec::new(),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.instance.is_some()
    }

    pub fn instance(&self) -> Option<&MapInstance> {
        self.instance.as_ref()
    }

    pub fn instance_mut(&mut self) -> Option<&mut MapInstance> {
        self.instance.as_mut()
    }

    /// Dispose of the live instance. Returns whether there was one.
    pub fn unmount(&mut self) -> bool {
        match self.instance.take() {
            Some(_) => {
                info!("map disposed");
                true
            }
            None => false,
        }
    }

    /// Number of instances created over the host's lifetime
    pub fn instances_created(&self) -> u64 {
        self.created
    }
}

impl Drop for MapHost {
    fn drop(&mut self) {
        self.unmount();
    }
}
