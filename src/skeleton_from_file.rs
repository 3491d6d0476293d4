//! Supports reading the skeleton from YAML file (optional)

use std::path::Path;

use nalgebra::Vector3;
use regex::{Captures, Regex};
use yaml_rust2::{Yaml, YamlLoader};

use crate::dh::DhParameters;
use crate::parameter_error::ParameterError;
use crate::settings::ControlSettings;
use crate::skeleton::{Bone, BoneKind, FingerPair, Skeleton};

impl Skeleton {
    /// Read the robot skeleton from YAML file. YAML file like this is supported:
    /// ```yaml
    /// links:
    ///   - name: platform
    ///     kind: base
    ///     translation: [0, 0, 0]
    ///   - name: shoulder
    ///     kind: revolute
    ///     translation: [0, 0, 1]
    ///     dh: [deg(90), 0.0, 1.0, 0.0]
    ///   - name: hand
    ///     kind: manipulator
    ///     translation: [2, 0, 1]
    /// gripper:
    ///   left: [0.1, 0.1, 0]
    ///   right: [0.1, 0.3, 0]
    /// settings:
    ///   lerp_factor: 0.2
    ///   dwell_frames: 30
    /// ```
    /// `dh` and `settings` (and any of its fields) are optional.
    ///
    /// YAML extension to parse the deg(angle) function is supported.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ParameterError> {
        let contents = std::fs::read_to_string(path)?;
        Skeleton::from_yaml_str(&contents)
    }

    /// Same as [Skeleton::from_yaml_file], from the YAML text.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ParameterError> {
        let contents = replace_degrees(contents)?;
        let docs = YamlLoader::load_from_str(&contents)
            .map_err(|e| ParameterError::ParseError(e.to_string()))?;
        let doc = docs.first()
            .ok_or_else(|| ParameterError::ParseError("empty YAML document".to_string()))?;

        let links = doc["links"].as_vec()
            .ok_or_else(|| ParameterError::MissingField("links".to_string()))?;
        let bones = links.iter().enumerate()
            .map(|(i, link)| parse_bone(i, link))
            .collect::<Result<Vec<_>, _>>()?;

        let gripper = &doc["gripper"];
        if gripper.is_badvalue() {
            return Err(ParameterError::MissingField("gripper".to_string()));
        }
        let fingers = FingerPair::new(
            vector3(&gripper["left"], "gripper.left")?,
            vector3(&gripper["right"], "gripper.right")?,
        );

        let skeleton = Skeleton {
            bones,
            gripper: Some(fingers),
            settings: parse_settings(&doc["settings"])?,
        };
        skeleton.validate()?;
        Ok(skeleton)
    }
}

/// Rewrites every deg(x) in the text into radians before the YAML parser sees it.
fn replace_degrees(contents: &str) -> Result<String, ParameterError> {
    let re = Regex::new(r"deg\(\s*([-+]?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?)\s*\)")
        .map_err(|_| ParameterError::ParseError("Invalid regex pattern".to_string()))?;
    if let Some(bad) = Regex::new(r"deg\([^)]*\)")
        .map_err(|_| ParameterError::ParseError("Invalid regex pattern".to_string()))?
        .find_iter(contents)
        .find(|m| !re.is_match(m.as_str()))
    {
        return Err(ParameterError::WrongAngle(bad.as_str().to_string()));
    }

    Ok(re.replace_all(contents, |caps: &Captures| {
        // The pattern only matches valid floats
        let degrees: f64 = caps[1].parse().unwrap_or(f64::NAN);
        format!("{:?}", degrees.to_radians())
    }).into_owned())
}

fn parse_bone(index: usize, link: &Yaml) -> Result<Bone, ParameterError> {
    let field = |name: &str| format!("links[{}].{}", index, name);

    let name = link["name"].as_str()
        .ok_or_else(|| ParameterError::MissingField(field("name")))?;
    let kind_name = link["kind"].as_str()
        .ok_or_else(|| ParameterError::MissingField(field("kind")))?;
    let kind = BoneKind::from_name(kind_name).ok_or_else(|| ParameterError::ParseError(format!(
        "{}: unknown kind '{}' (expected base, revolute, prismatic or manipulator)",
        field("kind"), kind_name
    )))?;
    let translation = vector3(&link["translation"], &field("translation"))?;

    let dh = &link["dh"];
    if dh.is_badvalue() {
        return Ok(Bone::new(name, kind, translation));
    }
    let values = numbers(dh, &field("dh"))?;
    if values.len() != 4 {
        return Err(ParameterError::InvalidLength { expected: 4, found: values.len() });
    }
    let dh = DhParameters::from_array([values[0], values[1], values[2], values[3]]);
    Ok(Bone::with_dh(name, kind, translation, dh))
}

fn parse_settings(section: &Yaml) -> Result<ControlSettings, ParameterError> {
    let mut settings = ControlSettings::default();
    if section.is_badvalue() {
        return Ok(settings);
    }

    let optional = |key: &str| -> Result<Option<f64>, ParameterError> {
        let value = &section[key];
        if value.is_badvalue() {
            Ok(None)
        } else {
            number(value, &format!("settings.{}", key)).map(Some)
        }
    };

    if let Some(lerp_factor) = optional("lerp_factor")? {
        settings.lerp_factor = lerp_factor;
    }
    if let Some(dwell_frames) = section["dwell_frames"].as_i64() {
        settings.dwell_frames = u32::try_from(dwell_frames).map_err(|_| ParameterError::ParseError(
            format!("settings.dwell_frames out of range: {}", dwell_frames)
        ))?;
    } else if !section["dwell_frames"].is_badvalue() {
        return Err(ParameterError::ParseError("settings.dwell_frames must be an integer".to_string()));
    }
    if let Some(step) = optional("revolute_step")? {
        settings.steps.revolute = step;
    }
    if let Some(step) = optional("prismatic_step")? {
        settings.steps.prismatic = step;
    }
    if let Some(step) = optional("gripper_step")? {
        settings.steps.gripper = step;
    }
    settings.validated()
}

/// Reads a number, integer or real.
fn number(value: &Yaml, field: &str) -> Result<f64, ParameterError> {
    match value {
        Yaml::Real(_) => value.as_f64(),
        Yaml::Integer(i) => Some(*i as f64),
        _ => None,
    }
    .ok_or_else(|| ParameterError::ParseError(format!("{} must be a number", field)))
}

fn numbers(value: &Yaml, field: &str) -> Result<Vec<f64>, ParameterError> {
    let items = value.as_vec()
        .ok_or_else(|| ParameterError::MissingField(field.to_string()))?;
    items.iter().map(|item| number(item, field)).collect()
}

fn vector3(value: &Yaml, field: &str) -> Result<Vector3<f64>, ParameterError> {
    let values = numbers(value, field)?;
    if values.len() != 3 {
        return Err(ParameterError::InvalidLength { expected: 3, found: values.len() });
    }
    Ok(Vector3::new(values[0], values[1], values[2]))
}
