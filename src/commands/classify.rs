use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{
    Category, Example, LabeledError, ListStream, PipelineData, Signature, Signals, SyntaxShape,
    Type, Value,
};

use super::util::{append_columns, classification_columns, labeled, normalize_input, raw_field};
use crate::algo::matcher::FeatureVector;
use crate::algo::parse::RawField;
use crate::algo::table::ReferenceTable;
use crate::ops;
use crate::AgronomyPlugin;

pub struct Classify;

impl PluginCommand for Classify {
    type Plugin = AgronomyPlugin;

    fn name(&self) -> &str {
        "agronomy classify"
    }

    fn description(&self) -> &str {
        "Nearest-centroid classification against a reference table file or a builtin table"
    }

    fn extra_description(&self) -> &str {
        "Each row is read by the table's feature and tag names. Unparseable feature \
         values are NaN and skipped where the centroid also lacks the feature."
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_types(vec![
                (Type::table(), Type::table()),
                (Type::record(), Type::table()),
            ])
            .named(
                "table",
                SyntaxShape::String,
                "Path to a reference table JSON file",
                Some('t'),
            )
            .named(
                "builtin",
                SyntaxShape::String,
                "Builtin table when no --table is given: crop, fertilizer (default: crop)",
                Some('b'),
            )
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["classify", "centroid", "nearest", "label"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![
            Example {
                example: r#"[[n p k temp hum moist soil crop]; [37 0 0 26 52 38 Sandy Maize]] | agronomy classify --builtin fertilizer"#,
                description: "Classify against the builtin fertilizer table using its short feature names",
                result: None,
            },
            Example {
                example: r#"open plots.json | agronomy classify --table my-varieties.json"#,
                description: "Classify against a custom reference table",
                result: None,
            },
        ]
    }

    fn run(
        &self,
        _plugin: &AgronomyPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let head = call.head;
        let path: Option<String> = call.get_flag("table")?;
        let builtin: String = call
            .get_flag::<String>("builtin")?
            .unwrap_or_else(|| "crop".into());

        let table =
            ops::resolve_table(None, path.as_deref(), Some(builtin.as_str())).map_err(labeled)?;

        let results: Vec<Value> = normalize_input(input, head)
            .into_iter()
            .map(|row| {
                let result = table.classify(&row_features(&row, &table));
                append_columns(row, classification_columns("_label", result, head), head)
            })
            .collect();

        Ok(ListStream::new(results.into_iter(), head, Signals::empty()).into())
    }
}

fn row_features(row: &Value, table: &ReferenceTable) -> FeatureVector {
    let numeric = table
        .feature_names()
        .into_iter()
        .fold(FeatureVector::new(), |fv, name| {
            fv.with(name, raw_field(row, name).or_nan())
        });
    table.tag_names().into_iter().fold(numeric, |fv, name| {
        let tag = match raw_field(row, name) {
            RawField::Text(s) => Some(s),
            _ => None,
        };
        fv.with_category(name, tag.as_deref())
    })
}
