// Theme domain model
use serde::Deserialize;

/// User-configured colors and knobs consumed by the recolorer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub overall_background: String,
    pub padding: f64,

    pub logo_color: String,
    pub yr_logo_background_color: String,
    pub yr_logo_text_color: String,
    /// Used for both Y and X axis icons
    pub y_axis_icon_color: String,
    pub main_text_color: String,
    pub secondary_text_color: String,

    pub grid_line_color: String,
    pub grid_line_width: f64,
    pub grid_line_opacity: f64,

    pub temperature_line_color: String,
    pub wind_line_color: String,
    pub wind_gust_line_color: String,
    pub precipitation_bar_color: String,
    pub max_precipitation_color: String,

    pub coast_wind_color: String,
    pub coast_wind_gust_color: String,
    pub wave_height_color: String,
    pub sea_current_color: String,
    pub sea_air_temp_color: String,
    pub sea_water_temp_color: String,

    pub refresh_icon_color: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            overall_background: "#ffffff".to_string(),
            padding: 0.0,
            logo_color: "#56616c".to_string(),
            yr_logo_background_color: "#00b8f1".to_string(),
            yr_logo_text_color: "#ffffff".to_string(),
            y_axis_icon_color: "#56616c".to_string(),
            main_text_color: "#21292b".to_string(),
            secondary_text_color: "#56616c".to_string(),
            grid_line_color: "#c3d0d8".to_string(),
            grid_line_width: 1.0,
            grid_line_opacity: 1.0,
            temperature_line_color: "#c60000".to_string(),
            wind_line_color: "#aa00f2".to_string(),
            wind_gust_line_color: "#aa00f2".to_string(),
            precipitation_bar_color: "#006edb".to_string(),
            max_precipitation_color: "#006edb".to_string(),
            coast_wind_color: "#aa00f2".to_string(),
            coast_wind_gust_color: "#aa00f2".to_string(),
            wave_height_color: "#006edb".to_string(),
            sea_current_color: "#008a00".to_string(),
            sea_air_temp_color: "#c60000".to_string(),
            sea_water_temp_color: "#c60000".to_string(),
            refresh_icon_color: "#21292b".to_string(),
        }
    }
}

/// One named slot of [`ThemeConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeRole {
    OverallBackground,
    LogoColor,
    YrLogoBackground,
    YrLogoText,
    AxisIcon,
    MainText,
    SecondaryText,
    GridLine,
    GridLineWidth,
    GridLineOpacity,
    TemperatureLine,
    WindLine,
    WindGustLine,
    PrecipitationBar,
    MaxPrecipitation,
    CoastWind,
    CoastWindGust,
    WaveHeight,
    SeaCurrent,
    SeaAirTemp,
    SeaWaterTemp,
    RefreshIcon,
}

impl ThemeConfig {
    /// CSS value for a role. Values are passed through untouched.
    pub fn value(&self, role: ThemeRole) -> String {
        match role {
            ThemeRole::OverallBackground => self.overall_background.clone(),
            ThemeRole::LogoColor => self.logo_color.clone(),
            ThemeRole::YrLogoBackground => self.yr_logo_background_color.clone(),
            ThemeRole::YrLogoText => self.yr_logo_text_color.clone(),
            ThemeRole::AxisIcon => self.y_axis_icon_color.clone(),
            ThemeRole::MainText => self.main_text_color.clone(),
            ThemeRole::SecondaryText => self.secondary_text_color.clone(),
            ThemeRole::GridLine => self.grid_line_color.clone(),
            ThemeRole::GridLineWidth => self.grid_line_width.to_string(),
            ThemeRole::GridLineOpacity => self.grid_line_opacity.to_string(),
            ThemeRole::TemperatureLine => self.temperature_line_color.clone(),
            ThemeRole::WindLine => self.wind_line_color.clone(),
            ThemeRole::WindGustLine => self.wind_gust_line_color.clone(),
            ThemeRole::PrecipitationBar => self.precipitation_bar_color.clone(),
            ThemeRole::MaxPrecipitation => self.max_precipitation_color.clone(),
            ThemeRole::CoastWind => self.coast_wind_color.clone(),
            ThemeRole::CoastWindGust => self.coast_wind_gust_color.clone(),
            ThemeRole::WaveHeight => self.wave_height_color.clone(),
            ThemeRole::SeaCurrent => self.sea_current_color.clone(),
            ThemeRole::SeaAirTemp => self.sea_air_temp_color.clone(),
            ThemeRole::SeaWaterTemp => self.sea_water_temp_color.clone(),
            ThemeRole::RefreshIcon => self.refresh_icon_color.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_theme_falls_back_to_defaults() {
        let theme: ThemeConfig =
            serde_json::from_str(r##"{ "wind_line_color": "#ff8800", "grid_line_width": 0.5 }"##)
                .unwrap();

        assert_eq!(theme.value(ThemeRole::WindLine), "#ff8800");
        assert_eq!(theme.value(ThemeRole::GridLineWidth), "0.5");
        assert_eq!(theme.value(ThemeRole::WindGustLine), "#aa00f2");
        assert_eq!(theme.overall_background, "#ffffff");
    }
}
