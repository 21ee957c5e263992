use anyhow::{Context, Result};

use crate::data::model::{DiagDataset, LevelKind, Role, TimeSeries};
use crate::figure::{build_figure, Figure, LevelSeries};
use crate::menus::{level_entries, obs_type_labels, parse_level_label, LevelEntry};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<DiagDataset>,

    /// Observation type menu labels.
    pub obs_types: Vec<String>,

    /// Index into `obs_types` of the current selection.
    pub selected_obs: Option<usize>,

    /// Cached series of the selected observation type.
    pub forecast: Option<TimeSeries>,
    pub analysis: Option<TimeSeries>,

    /// Vertical coordinate of the cached series.
    pub level_kind: Option<LevelKind>,

    /// Level menu rows, rebuilt on every observation type change.
    pub levels: Vec<LevelEntry>,

    /// Index into `levels` of the current selection.
    pub selected_level: Option<usize>,

    /// Last plotted figure.
    pub figure: Option<Figure>,

    /// Bumped on every plot so the view knows when to reapply axis limits.
    pub figure_generation: u64,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest a newly loaded dataset: fill the observation menu, select the
    /// first type and level, and plot.
    pub fn set_dataset(&mut self, dataset: DiagDataset) -> Result<()> {
        self.obs_types = obs_type_labels(&dataset);
        self.dataset = Some(dataset);
        self.selected_obs = None;
        self.forecast = None;
        self.analysis = None;
        self.level_kind = None;
        self.levels.clear();
        self.selected_level = None;
        self.figure = None;
        self.status_message = None;

        if self.obs_types.is_empty() {
            log::warn!("Dataset lists no observation types");
            return Ok(());
        }

        // Start on the first type whose series can be fetched.
        let first = (0..self.obs_types.len()).find(|&i| match self.select_obs_type(i) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Skipping {}: {e:#}", self.obs_types[i]);
                false
            }
        });
        if first.is_none() {
            anyhow::bail!("none of the {} observation types has data", self.obs_types.len());
        }
        if !self.levels.is_empty() {
            self.select_level(0)?;
        }
        Ok(())
    }

    /// Select an observation type: fetch its forecast and analysis series,
    /// determine the vertical coordinate and rebuild the level menu.
    pub fn select_obs_type(&mut self, index: usize) -> Result<()> {
        let dataset = self.dataset.as_ref().context("no dataset loaded")?;
        let obs_type = self
            .obs_types
            .get(index)
            .with_context(|| format!("observation type #{index} out of range"))?;

        let forecast = dataset.series(obs_type, Role::Forecast)?;
        let analysis = dataset.series(obs_type, Role::Analysis)?;
        let level_kind = forecast.level_kind_or_surface();
        log::debug!(
            "Selected {obs_type}: {} forecast records, {}",
            forecast.len(),
            level_kind.description()
        );

        self.selected_obs = Some(index);
        self.level_kind = Some(level_kind);
        self.levels = level_entries(&forecast);
        self.selected_level = None;
        self.forecast = Some(forecast);
        self.analysis = Some(analysis);
        Ok(())
    }

    /// Select a level and plot it.
    pub fn select_level(&mut self, index: usize) -> Result<()> {
        if index >= self.levels.len() {
            anyhow::bail!("level #{index} out of range");
        }
        self.selected_level = Some(index);
        self.plot()
    }

    /// Plot the currently selected observation type and level.
    pub fn plot(&mut self) -> Result<()> {
        let dataset = self.dataset.as_ref().context("no dataset loaded")?;
        let obs_type = self
            .selected_obs
            .and_then(|i| self.obs_types.get(i))
            .context("no observation type selected")?;
        let entry = self
            .selected_level
            .and_then(|i| self.levels.get(i))
            .context("no level selected")?;
        let level = parse_level_label(&entry.label)?;
        let (Some(forecast), Some(analysis)) = (&self.forecast, &self.analysis) else {
            anyhow::bail!("no series cached for {obs_type}");
        };

        let series = LevelSeries::at_level(forecast, analysis, level);
        let figure = build_figure(dataset, obs_type, level, &series);
        log::info!("Plotted {} with {} panels", figure.title, figure.panels.len());

        self.figure = Some(figure);
        self.figure_generation += 1;
        self.status_message = None;
        Ok(())
    }

    /// Label of the selected observation type.
    pub fn selected_obs_label(&self) -> Option<&str> {
        self.selected_obs
            .and_then(|i| self.obs_types.get(i))
            .map(String::as_str)
    }

    /// Run a fallible UI action, reporting failure in the status bar.
    pub fn report(&mut self, result: Result<()>) {
        if let Err(e) = result {
            log::error!("{e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Grid, TimeUnits};
    use crate::figure::PanelContent;
    use crate::menus::NO_DATA_SUFFIX;

    const NAN: f64 = f64::NAN;

    /// Times 0..3, copies rmse / Nposs / Nused, one level, three regions.
    fn series(
        obs_type: &str,
        role: Role,
        kind: Option<LevelKind>,
        level: f64,
        rmse: [[f64; 3]; 3],
    ) -> TimeSeries {
        let grid = Grid {
            times: vec![0.0, 1.0, 2.0],
            copies: vec!["rmse".into(), "Nposs".into(), "Nused".into()],
            levels: vec![level],
            regions: 3,
        };
        let mut values = Vec::new();
        for per_time in rmse {
            values.extend(per_time);
            values.extend([50.0, 60.0, 70.0]);
            values.extend([40.0, 0.0, 65.0]);
        }
        TimeSeries::from_grid(obs_type, role, kind, &grid, &values).unwrap()
    }

    fn regions() -> Vec<String> {
        vec![
            "Northern Hemisphere".into(),
            "Tropics".into(),
            "Southern Hemisphere".into(),
        ]
    }

    /// Two observation types with one level each; region 2 of the radiosonde
    /// forecast is entirely missing.
    fn dataset() -> DiagDataset {
        let sonde_fc = [[1.0, NAN, 2.0], [1.5, NAN, 2.5], [NAN, NAN, 3.0]];
        let sonde_an = [[0.8, 0.1, 1.5], [1.2, NAN, 2.0], [NAN, NAN, 2.2]];
        let metar = [[0.5, 0.5, 0.5], [0.6, 0.6, 0.6], [0.7, 0.7, 0.7]];
        let missing = [[NAN; 3]; 3];
        let (sonde, gpsro) = ("RADIOSONDE_TEMPERATURE", "GPSRO_REFRACTIVITY");
        let (plevel, hlevel) = (Some(LevelKind::Pressure), Some(LevelKind::Height));
        DiagDataset::new(
            vec![sonde.into(), "METAR_ALTIMETER".into(), gpsro.into()],
            regions(),
            TimeUnits::default(),
            vec![
                series(sonde, Role::Forecast, plevel, 500.0, sonde_fc),
                series(sonde, Role::Analysis, plevel, 500.0, sonde_an),
                series("METAR_ALTIMETER", Role::Forecast, None, 1.0, metar),
                series("METAR_ALTIMETER", Role::Analysis, None, 1.0, metar),
                series(gpsro, Role::Forecast, hlevel, 5000.0, missing),
                series(gpsro, Role::Analysis, hlevel, 5000.0, missing),
            ],
        )
    }

    #[test]
    fn startup_skips_types_without_series() {
        let metar = [[0.5, 0.5, 0.5], [0.6, 0.6, 0.6], [0.7, 0.7, 0.7]];
        let ds = DiagDataset::new(
            vec!["EMPTY_TYPE".into(), "METAR_ALTIMETER".into()],
            regions(),
            TimeUnits::default(),
            vec![
                series("METAR_ALTIMETER", Role::Forecast, None, 1.0, metar),
                series("METAR_ALTIMETER", Role::Analysis, None, 1.0, metar),
            ],
        );
        let mut state = AppState::default();
        state.set_dataset(ds).unwrap();
        assert_eq!(state.selected_obs_label(), Some("METAR_ALTIMETER"));
        assert_eq!(state.levels.len(), 1);
        assert!(state.figure.is_some());
        // The empty type stays listed; picking it is reported, not fatal.
        assert_eq!(state.obs_types.len(), 2);
        assert!(state.select_obs_type(0).is_err());
    }

    #[test]
    fn startup_fails_when_no_type_has_series() {
        let ds = DiagDataset::new(
            vec!["EMPTY_TYPE".into()],
            regions(),
            TimeUnits::default(),
            vec![],
        );
        let mut state = AppState::default();
        let err = state.set_dataset(ds).unwrap_err();
        assert!(err.to_string().contains("none of the 1 observation types"));
        assert!(state.figure.is_none());
    }

    #[test]
    fn every_plot_bumps_the_generation() {
        let mut state = AppState::default();
        state.set_dataset(dataset()).unwrap();
        let first = state.figure_generation;
        assert!(first > 0);
        state.plot().unwrap();
        assert_eq!(state.figure_generation, first + 1);
        assert!(state.select_level(9).is_err());
        assert_eq!(state.figure_generation, first + 1);
    }

    #[test]
    fn startup_selects_first_entries_and_plots() {
        let mut state = AppState::default();
        state.set_dataset(dataset()).unwrap();
        assert_eq!(state.selected_obs_label(), Some("RADIOSONDE_TEMPERATURE"));
        assert_eq!(state.level_kind, Some(LevelKind::Pressure));
        assert_eq!(state.selected_level, Some(0));
        assert!(state.figure.is_some());
    }

    #[test]
    fn end_to_end_three_regions_with_placeholder() {
        let mut state = AppState::default();
        state.set_dataset(dataset()).unwrap();
        let fig = state.figure.as_ref().unwrap();

        assert_eq!(fig.title, "RADIOSONDE_TEMPERATURE @ 500");
        assert_eq!(fig.panels.len(), 3);
        assert!(matches!(fig.panels[1].content, PanelContent::Placeholder { .. }));
        assert!(fig.panels[1].title.starts_with("Tropics"));
        for i in [0, 2] {
            let PanelContent::Chart(chart) = &fig.panels[i].content else {
                panic!("region {} should be a chart", i + 1);
            };
            assert!(!chart.forecast.is_empty());
            assert!(!chart.analysis.is_empty());
            assert_eq!(chart.possible.len(), 3);
            assert_eq!(chart.used.len(), 3);
        }
    }

    #[test]
    fn surface_is_default_level_kind() {
        let mut state = AppState::default();
        state.set_dataset(dataset()).unwrap();
        state.select_obs_type(1).unwrap();
        assert_eq!(state.level_kind, Some(LevelKind::Surface));
        assert_eq!(state.levels.len(), 1);
        assert_eq!(state.levels[0].label, "1");
    }

    #[test]
    fn repopulating_levels_is_idempotent() {
        let mut state = AppState::default();
        state.set_dataset(dataset()).unwrap();
        state.select_obs_type(0).unwrap();
        let first = state.levels.clone();
        state.select_obs_type(1).unwrap();
        assert_ne!(state.levels, first);
        state.select_obs_type(0).unwrap();
        assert_eq!(state.levels, first);
    }

    #[test]
    fn no_data_level_is_flagged_and_still_plots() {
        let mut state = AppState::default();
        state.set_dataset(dataset()).unwrap();
        state.select_obs_type(2).unwrap();
        assert_eq!(state.levels.len(), 1);
        let entry = &state.levels[0];
        assert!(entry.label.ends_with(NO_DATA_SUFFIX));
        assert_eq!(parse_level_label(&entry.label).unwrap(), 5000.0);

        state.select_level(0).unwrap();
        let fig = state.figure.as_ref().unwrap();
        assert_eq!(fig.title, "GPSRO_REFRACTIVITY @ 5000");
        assert!(fig
            .panels
            .iter()
            .all(|p| matches!(p.content, PanelContent::Placeholder { .. })));
    }

    #[test]
    fn out_of_range_selection_is_reported() {
        let mut state = AppState::default();
        state.set_dataset(dataset()).unwrap();
        let result = state.select_level(7);
        assert!(result.is_err());
        state.report(result);
        assert!(state.status_message.as_deref().unwrap().contains("out of range"));
    }

    #[test]
    fn plot_without_dataset_fails() {
        let mut state = AppState::default();
        assert!(state.plot().is_err());
    }
}
