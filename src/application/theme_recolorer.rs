// Theme recolorer - Scoped CSS layered over sanitized SVG markup
use crate::domain::theme::{ThemeConfig, ThemeRole};

/// Where a selector applies inside the scoped widget container.
#[derive(Debug, Clone, Copy)]
pub enum Target {
    /// Inside the rendered graph: `.svg-image-container svg <selector>`
    Graph(&'static str),
    /// Anywhere in the widget, for HTML-flavoured upstream markup
    Widget(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub enum CssValue {
    Role(ThemeRole),
    RoleWithUnit(ThemeRole, &'static str),
    Literal(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct Declaration {
    pub property: &'static str,
    pub value: CssValue,
}

/// Selectors sharing one set of declarations.
#[derive(Debug, Clone, Copy)]
pub struct RecolorRule {
    pub targets: &'static [Target],
    pub declarations: &'static [Declaration],
}

const fn role(property: &'static str, role: ThemeRole) -> Declaration {
    Declaration {
        property,
        value: CssValue::Role(role),
    }
}

const fn literal(property: &'static str, value: &'static str) -> Declaration {
    Declaration {
        property,
        value: CssValue::Literal(value),
    }
}

/// Selector table keyed on the upstream provider's markup: literal colors,
/// dash patterns, `rx` and logo offsets. A change upstream makes a rule
/// silently match nothing.
///
/// The two purple wind roles are told apart by `stroke-dasharray` on paths
/// and by `rx` on legend chips; each pair of selectors is mutually exclusive.
pub const RECOLOR_RULES: &[RecolorRule] = &[
    // Text
    RecolorRule {
        targets: &[
            Target::Graph(".location-header"),
            Target::Graph(".day-label"),
            Target::Graph(".served-by-header"),
            Target::Graph(".legend-label"),
            Target::Graph("text"),
        ],
        declarations: &[role("fill", ThemeRole::MainText)],
    },
    RecolorRule {
        targets: &[Target::Graph(".hour-label"), Target::Graph(".y-axis-label")],
        declarations: &[role("fill", ThemeRole::SecondaryText)],
    },
    // Axis icons
    RecolorRule {
        targets: &[Target::Graph("g[filter*=\"invert\"]")],
        declarations: &[literal("filter", "none")],
    },
    RecolorRule {
        targets: &[
            Target::Graph("[fill=\"#56616c\"]"),
            Target::Graph("[stroke=\"#56616c\"]"),
            Target::Graph("[style*=\"fill:#56616c\"]"),
            Target::Graph("[style*=\"stroke:#56616c\"]"),
            Target::Graph("[style*=\"rgb(86,97,108)\"]"),
        ],
        declarations: &[
            role("fill", ThemeRole::AxisIcon),
            role("stroke", ThemeRole::AxisIcon),
        ],
    },
    RecolorRule {
        targets: &[Target::Graph("[stroke=\"currentColor\"]")],
        declarations: &[role("stroke", ThemeRole::AxisIcon)],
    },
    RecolorRule {
        targets: &[Target::Graph("[fill=\"currentColor\"]")],
        declarations: &[role("fill", ThemeRole::AxisIcon)],
    },
    // Grid
    RecolorRule {
        targets: &[
            Target::Graph("line[stroke=\"#c3d0d8\"]"),
            Target::Graph("line[stroke=\"#56616c\"]"),
        ],
        declarations: &[
            role("stroke", ThemeRole::GridLine),
            Declaration {
                property: "stroke-width",
                value: CssValue::RoleWithUnit(ThemeRole::GridLineWidth, "px"),
            },
            role("stroke-opacity", ThemeRole::GridLineOpacity),
        ],
    },
    // Series lines
    RecolorRule {
        targets: &[Target::Graph("path[stroke=\"url(#temperature-curve-gradient)\"]")],
        declarations: &[role("stroke", ThemeRole::TemperatureLine)],
    },
    RecolorRule {
        targets: &[Target::Graph("path[stroke=\"#aa00f2\"]:not([stroke-dasharray])")],
        declarations: &[role("stroke", ThemeRole::WindLine)],
    },
    RecolorRule {
        targets: &[Target::Graph("path[stroke=\"#aa00f2\"][stroke-dasharray]")],
        declarations: &[role("stroke", ThemeRole::WindGustLine)],
    },
    // Legend chips are nested <svg> blocks
    RecolorRule {
        targets: &[Target::Graph("svg rect[fill=\"#c60000\"]")],
        declarations: &[role("fill", ThemeRole::TemperatureLine)],
    },
    RecolorRule {
        targets: &[Target::Graph("svg rect[fill=\"#aa00f2\"]:not([rx])")],
        declarations: &[role("fill", ThemeRole::WindLine)],
    },
    RecolorRule {
        targets: &[Target::Graph("svg rect[fill=\"#aa00f2\"][rx]")],
        declarations: &[role("fill", ThemeRole::WindGustLine)],
    },
    // Precipitation
    RecolorRule {
        targets: &[Target::Graph("rect[fill=\"#006edb\"]")],
        declarations: &[role("fill", ThemeRole::PrecipitationBar)],
    },
    RecolorRule {
        targets: &[
            Target::Graph("line[stroke=\"#006edb\"]"),
            Target::Graph("path[stroke=\"#006edb\"]"),
        ],
        declarations: &[role("stroke", ThemeRole::PrecipitationBar)],
    },
    RecolorRule {
        targets: &[Target::Graph("#max-precipitation-pattern rect")],
        declarations: &[
            role("fill", ThemeRole::MaxPrecipitation),
            literal("opacity", "0.3"),
        ],
    },
    RecolorRule {
        targets: &[Target::Graph("#max-precipitation-pattern line")],
        declarations: &[
            role("stroke", ThemeRole::MaxPrecipitation),
            literal("opacity", "1"),
        ],
    },
    // Coastal graph series
    RecolorRule {
        targets: &[Target::Widget(".coast-graph__wind")],
        declarations: &[role("color", ThemeRole::CoastWind)],
    },
    RecolorRule {
        targets: &[Target::Widget(".graph-line--dashed.coast-graph__wind")],
        declarations: &[role("color", ThemeRole::CoastWindGust)],
    },
    RecolorRule {
        targets: &[Target::Widget(".coast-graph__wave-height")],
        declarations: &[role("color", ThemeRole::WaveHeight)],
    },
    RecolorRule {
        targets: &[Target::Widget(".coast-graph__sea-current")],
        declarations: &[role("color", ThemeRole::SeaCurrent)],
    },
    RecolorRule {
        targets: &[Target::Widget(".graph-temperature-line>.graph-line:not(.graph-line--dashed)")],
        declarations: &[role("color", ThemeRole::SeaAirTemp)],
    },
    RecolorRule {
        targets: &[Target::Widget(".graph-temperature-line>.graph-line--dashed")],
        declarations: &[role("color", ThemeRole::SeaWaterTemp)],
    },
    // Coastal graph legend chips
    RecolorRule {
        targets: &[Target::Widget("[data-type=\"wind-curve\"] .graph-legend-new__line")],
        declarations: &[role("color", ThemeRole::CoastWind)],
    },
    RecolorRule {
        targets: &[Target::Widget("[data-type=\"wind-gust-curve\"] .graph-legend-new__line")],
        declarations: &[role("color", ThemeRole::CoastWindGust)],
    },
    RecolorRule {
        targets: &[Target::Widget("[data-type=\"wave-height-curve\"] .graph-legend-new__line")],
        declarations: &[role("color", ThemeRole::WaveHeight)],
    },
    RecolorRule {
        targets: &[Target::Widget("[data-type=\"sea-current-curve\"] .graph-legend-new__line")],
        declarations: &[role("color", ThemeRole::SeaCurrent)],
    },
    RecolorRule {
        targets: &[Target::Widget("[data-type=\"sea-air-temp-curve\"] .graph-legend-new__line")],
        declarations: &[role("color", ThemeRole::SeaAirTemp)],
    },
    RecolorRule {
        targets: &[Target::Widget("[data-type=\"sea-water-temp-curve\"] .graph-legend-new__line")],
        declarations: &[role("color", ThemeRole::SeaWaterTemp)],
    },
    // Synthesized wave chart
    RecolorRule {
        targets: &[Target::Graph("rect.wave-bar")],
        declarations: &[role("fill", ThemeRole::WaveHeight)],
    },
    // Logos, matched by horizontal offset
    RecolorRule {
        targets: &[Target::Graph("svg[x=\"16\"] circle")],
        declarations: &[role("fill", ThemeRole::YrLogoBackground)],
    },
    RecolorRule {
        targets: &[Target::Graph("svg[x=\"16\"] path")],
        declarations: &[role("fill", ThemeRole::YrLogoText)],
    },
    RecolorRule {
        targets: &[
            Target::Graph("svg[x=\"624\"] path"),
            Target::Graph("svg[x=\"675.5\"] path"),
        ],
        declarations: &[role("fill", ThemeRole::LogoColor)],
    },
];

/// CSS class isolating one widget's rules from every other widget on the page
pub fn scope_class(widget_id: &str) -> String {
    let sanitized: String = widget_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    format!("yrw-{}", sanitized)
}

/// Full stylesheet for one widget: container layout first, then the
/// recolor table with every declaration marked `!important`.
pub fn build_scoped_css(theme: &ThemeConfig, scope: &str) -> String {
    let mut css = layout_css(theme, scope);
    for rule in RECOLOR_RULES {
        css.push_str(&render_rule(rule, theme, scope));
    }
    css
}

fn layout_css(theme: &ThemeConfig, scope: &str) -> String {
    format!(
        r#".{scope} {{
  box-sizing: border-box;
  width: 100%;
  height: 100%;
  padding: {padding}px;
  display: flex;
  align-items: center;
  justify-content: center;
  overflow: hidden;
  position: relative;
  background-color: {background};
}}
.{scope} .svg-image-container {{
  width: 100%;
  height: 100%;
  display: flex;
  align-items: center;
  justify-content: center;
  overflow: hidden;
}}
.{scope} .refresh-button {{
  position: absolute;
  top: 12px;
  right: 12px;
  cursor: pointer;
  background: rgba(255,255,255,0.7);
  border-radius: 50%;
  padding: 2px;
  z-index: 10;
  line-height: 0;
  border: none;
  color: {refresh};
}}
.{scope} .refresh-button svg path {{
  stroke: currentColor !important;
  fill: none !important;
}}
.{scope} .svg-image-container svg {{
  width: 100%;
  height: 100%;
  display: block;
  background-color: {background} !important;
}}
"#,
        scope = scope,
        padding = theme.padding,
        background = theme.value(ThemeRole::OverallBackground),
        refresh = theme.value(ThemeRole::RefreshIcon),
    )
}

fn render_rule(rule: &RecolorRule, theme: &ThemeConfig, scope: &str) -> String {
    let selectors: Vec<String> = rule
        .targets
        .iter()
        .map(|target| match target {
            Target::Graph(selector) => format!(".{} .svg-image-container svg {}", scope, selector),
            Target::Widget(selector) => format!(".{} {}", scope, selector),
        })
        .collect();

    let mut block = selectors.join(",\n");
    block.push_str(" {\n");
    for declaration in rule.declarations {
        let value = match declaration.value {
            CssValue::Role(role) => theme.value(role),
            CssValue::RoleWithUnit(role, unit) => format!("{}{}", theme.value(role), unit),
            CssValue::Literal(value) => value.to_string(),
        };
        block.push_str(&format!("  {}: {} !important;\n", declaration.property, value));
    }
    block.push_str("}\n");
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme() -> ThemeConfig {
        ThemeConfig {
            wind_line_color: "#11aa11".to_string(),
            wind_gust_line_color: "#aa1111".to_string(),
            grid_line_width: 0.5,
            grid_line_opacity: 0.4,
            logo_color: "#abcdef".to_string(),
            ..ThemeConfig::default()
        }
    }

    fn rule_body<'a>(css: &'a str, selector: &str) -> &'a str {
        let start = css.find(selector).unwrap_or_else(|| panic!("missing {}", selector));
        let open = css[start..].find('{').unwrap() + start;
        let close = css[open..].find('}').unwrap() + open;
        &css[open + 1..close]
    }

    #[test]
    fn test_every_rule_is_scoped() {
        let css = build_scoped_css(&theme(), "yrw-widget_3");
        for line in css.lines().filter(|l| l.ends_with('{') || l.ends_with(',')) {
            assert!(line.starts_with(".yrw-widget_3"), "unscoped selector: {}", line);
        }
    }

    #[test]
    fn test_wind_roles_are_disambiguated() {
        let css = build_scoped_css(&theme(), "yrw-a");

        let solid = rule_body(&css, "path[stroke=\"#aa00f2\"]:not([stroke-dasharray])");
        assert_eq!(solid.trim(), "stroke: #11aa11 !important;");
        let dashed = rule_body(&css, "path[stroke=\"#aa00f2\"][stroke-dasharray]");
        assert_eq!(dashed.trim(), "stroke: #aa1111 !important;");

        let chip = rule_body(&css, "svg rect[fill=\"#aa00f2\"]:not([rx])");
        assert_eq!(chip.trim(), "fill: #11aa11 !important;");
        let rounded_chip = rule_body(&css, "svg rect[fill=\"#aa00f2\"][rx]");
        assert_eq!(rounded_chip.trim(), "fill: #aa1111 !important;");
    }

    #[test]
    fn test_grid_numeric_knobs() {
        let css = build_scoped_css(&theme(), "yrw-a");
        let grid = rule_body(&css, "line[stroke=\"#c3d0d8\"]");
        assert!(grid.contains("stroke-width: 0.5px !important;"));
        assert!(grid.contains("stroke-opacity: 0.4 !important;"));
    }

    #[test]
    fn test_logo_offsets_share_one_rule() {
        let css = build_scoped_css(&theme(), "yrw-a");
        assert!(css.contains(
            ".yrw-a .svg-image-container svg svg[x=\"624\"] path,\n.yrw-a .svg-image-container svg svg[x=\"675.5\"] path {\n  fill: #abcdef !important;\n}"
        ));
    }

    #[test]
    fn test_recolor_declarations_are_important() {
        let theme = theme();
        for rule in RECOLOR_RULES {
            let block = render_rule(rule, &theme, "s");
            for line in block.lines().filter(|l| l.starts_with("  ")) {
                assert!(line.ends_with(" !important;"), "{}", line);
            }
        }
    }

    #[test]
    fn test_invalid_theme_values_pass_through() {
        let theme = ThemeConfig {
            main_text_color: "not-a-color".to_string(),
            ..ThemeConfig::default()
        };
        let css = build_scoped_css(&theme, "yrw-a");
        assert!(css.contains("fill: not-a-color !important;"));
    }

    #[test]
    fn test_scope_class_sanitizes_id() {
        assert_eq!(scope_class("coast/Oslo fjord"), "yrw-coast-Oslo-fjord");
        assert_eq!(scope_class("widget_1"), "yrw-widget_1");
    }
}
