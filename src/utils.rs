use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use std::collections::BTreeMap;

/// Convert a LabelSelector's match_labels to a string for listing.
pub fn selector_to_labels_string(selector: &LabelSelector) -> Option<String> {
    if let Some(labels) = &selector.match_labels {
        if labels.is_empty() {
            None
        } else {
            Some(
                labels
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join(","),
            )
        }
    } else {
        None
    }
}

/// Check if pod labels match the given LabelSelector.
pub fn matches_selector(pod_labels: &BTreeMap<String, String>, selector: &LabelSelector) -> bool {
    // Check match_labels
    if let Some(match_labels) = &selector.match_labels {
        for (key, value) in match_labels {
            if pod_labels.get(key) != Some(value) {
                return false;
            }
        }
    }
    // Check match_expressions
    if let Some(expressions) = &selector.match_expressions {
        for expr in expressions {
            let pod_value = pod_labels.get(&expr.key);
            match expr.operator.as_str() {
                "In" => match (&expr.values, pod_value) {
                    (Some(values), Some(value)) if values.contains(value) => {}
                    _ => return false,
                },
                "NotIn" => match (&expr.values, pod_value) {
                    (Some(values), Some(value)) if values.contains(value) => return false,
                    (Some(_), _) => {}
                    (None, _) => return false,
                },
                "Exists" => {
                    if pod_value.is_none() {
                        return false;
                    }
                }
                "DoesNotExist" => {
                    if pod_value.is_some() {
                        return false;
                    }
                }
                _ => return false, // Unknown operator
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelectorRequirement;

    #[test]
    fn selector_to_labels_string_renders_pairs() {
        let mut labels = BTreeMap::new();
        labels.insert("app".to_string(), "nginx".to_string());
        labels.insert("version".to_string(), "v1".to_string());
        let selector = LabelSelector {
            match_labels: Some(labels),
            match_expressions: None,
        };
        let result = selector_to_labels_string(&selector);
        assert_eq!(result, Some("app=nginx,version=v1".to_string()));
    }

    #[test]
    fn selector_to_labels_string_empty_is_none() {
        let selector = LabelSelector {
            match_labels: Some(BTreeMap::new()),
            match_expressions: None,
        };
        assert_eq!(selector_to_labels_string(&selector), None);
    }

    #[test]
    fn matches_selector_labels() {
        let mut pod_labels = BTreeMap::new();
        pod_labels.insert("app".to_string(), "nginx".to_string());
        pod_labels.insert("version".to_string(), "v1".to_string());

        let mut sel_labels = BTreeMap::new();
        sel_labels.insert("app".to_string(), "nginx".to_string());
        let selector = LabelSelector {
            match_labels: Some(sel_labels),
            match_expressions: None,
        };

        assert!(matches_selector(&pod_labels, &selector));
    }

    #[test]
    fn matches_selector_expressions_in() {
        let mut pod_labels = BTreeMap::new();
        pod_labels.insert("env".to_string(), "prod".to_string());

        let expr = LabelSelectorRequirement {
            key: "env".to_string(),
            operator: "In".to_string(),
            values: Some(vec!["prod".to_string(), "dev".to_string()]),
        };
        let selector = LabelSelector {
            match_labels: None,
            match_expressions: Some(vec![expr]),
        };

        assert!(matches_selector(&pod_labels, &selector));
    }

    #[test]
    fn matches_selector_expressions_not_in_rejects() {
        let mut pod_labels = BTreeMap::new();
        pod_labels.insert("env".to_string(), "prod".to_string());

        let expr = LabelSelectorRequirement {
            key: "env".to_string(),
            operator: "NotIn".to_string(),
            values: Some(vec!["prod".to_string()]),
        };
        let selector = LabelSelector {
            match_labels: None,
            match_expressions: Some(vec![expr]),
        };

        assert!(!matches_selector(&pod_labels, &selector));
    }

    #[test]
    fn matches_selector_expressions_exists() {
        let mut pod_labels = BTreeMap::new();
        pod_labels.insert("app".to_string(), "nginx".to_string());

        let expr = LabelSelectorRequirement {
            key: "app".to_string(),
            operator: "Exists".to_string(),
            values: None,
        };
        let selector = LabelSelector {
            match_labels: None,
            match_expressions: Some(vec![expr]),
        };

        assert!(matches_selector(&pod_labels, &selector));
    }

    #[test]
    fn matches_selector_label_mismatch() {
        let mut pod_labels = BTreeMap::new();
        pod_labels.insert("app".to_string(), "nginx".to_string());

        let mut sel_labels = BTreeMap::new();
        sel_labels.insert("app".to_string(), "redis".to_string());
        let selector = LabelSelector {
            match_labels: Some(sel_labels),
            match_expressions: None,
        };

        assert!(!matches_selector(&pod_labels, &selector));
    }
}
