pub mod parse;
pub mod table;

use crate::config::DataConfig;
use crate::error::{DashboardError, Result};
use crate::map::geometry::Polygon;
use crate::map::{Boundaries, Region};
use geojson::{Feature, GeoJson, Geometry, Value};
use std::fs::{self, File};
use std::path::Path;
use table::{CountTable, HealthRecord, PercentTable, PopulationTable};

/// Everything the dashboard reads at startup
pub struct Dataset {
    pub boundaries: Boundaries,
    pub positive_pct: PercentTable,
    pub positive_cases: CountTable,
    pub death_cases: CountTable,
    pub population: PopulationTable,
    pub health: Vec<HealthRecord>,
}

/// Load every input in parallel. All must succeed; the first failure is returned.
pub fn load_dataset(config: &DataConfig) -> Result<Dataset> {
    let boundaries_path = config.path(&config.boundaries);
    let pct_path = config.path(&config.positive_percentage);
    let positive_path = config.path(&config.positive_cases);
    let death_path = config.path(&config.death_cases);
    let population_path = config.path(&config.population);
    let health_path = config.path(&config.health);

    let ((boundaries, positive_pct), ((positive_cases, death_cases), (population, health))) = rayon::join(
        || {
            rayon::join(
                || load_boundaries(&boundaries_path, &config.name_property),
                || read_table(&pct_path, parse::parse_percent_table),
            )
        },
        || {
            rayon::join(
                || {
                    rayon::join(
                        || read_table(&positive_path, parse::parse_count_table),
                        || read_table(&death_path, parse::parse_count_table),
                    )
                },
                || {
                    rayon::join(
                        || read_table(&population_path, parse::parse_population_table),
                        || read_table(&health_path, parse::parse_health_data),
                    )
                },
            )
        },
    );

    let dataset = Dataset {
        boundaries: boundaries?,
        positive_pct: positive_pct?,
        positive_cases: positive_cases?,
        death_cases: death_cases?,
        population: population?,
        health: health?,
    };

    tracing::info!(
        regions = dataset.boundaries.len(),
        percent_rows = dataset.positive_pct.len(),
        positive_rows = dataset.positive_cases.len(),
        death_rows = dataset.death_cases.len(),
        population_rows = dataset.population.len(),
        health_rows = dataset.health.len(),
        "dataset loaded"
    );

    Ok(dataset)
}

fn read_table<T>(path: &Path, parse: fn(File, &Path) -> Result<T>) -> Result<T> {
    let file = File::open(path).map_err(|e| DashboardError::load(path, e))?;
    let table = parse(file, path)?;
    tracing::debug!("Loaded {}", path.display());
    Ok(table)
}

/// Load named region boundaries from a GeoJSON FeatureCollection.
/// Features sharing a name are merged into one region.
pub fn load_boundaries(path: &Path, name_property: &str) -> Result<Boundaries> {
    let mut bytes = fs::read(path).map_err(|e| DashboardError::load(path, e))?;
    let geojson: GeoJson =
        simd_json::serde::from_slice(&mut bytes).map_err(|e| DashboardError::load(path, e))?;
    let regions = regions_from_geojson(geojson, name_property);
    if regions.is_empty() {
        return Err(DashboardError::load(path, "no named polygon features"));
    }
    tracing::debug!("Loaded {} regions from {}", regions.len(), path.display());
    Ok(Boundaries::new(regions))
}

/// Collect polygon features into regions, in first-seen order
pub fn regions_from_geojson(geojson: GeoJson, name_property: &str) -> Vec<Region> {
    let features: Vec<Feature> = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => Vec::new(),
    };

    let mut named: Vec<(String, Vec<Polygon>)> = Vec::new();
    for feature in features {
        let name = feature
            .properties
            .as_ref()
            .and_then(|p| p.get(name_property))
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let Some(name) = name else {
            tracing::warn!("Skipping feature without a {name_property:?} property");
            continue;
        };

        let mut polygons = Vec::new();
        if let Some(ref geometry) = feature.geometry {
            collect_polygons(geometry, &mut polygons);
        }
        if polygons.is_empty() {
            continue;
        }

        match named.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => existing.extend(polygons),
            None => named.push((name, polygons)),
        }
    }

    named
        .into_iter()
        .map(|(name, polygons)| Region::new(name, polygons))
        .collect()
}

fn collect_polygons(geometry: &Geometry, out: &mut Vec<Polygon>) {
    let to_ring = |coords: &Vec<Vec<f64>>| -> Vec<(f64, f64)> {
        coords
            .iter()
            .filter(|c| c.len() >= 2)
            .map(|c| (c[0], c[1]))
            .collect()
    };

    match &geometry.value {
        Value::Polygon(rings) => out.push(rings.iter().map(to_ring).collect()),
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                out.push(rings.iter().map(to_ring).collect());
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_polygons(g, out);
            }
        }
        _ => {}
    }
}
