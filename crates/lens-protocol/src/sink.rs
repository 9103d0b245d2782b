//! Consumer-facing surface for inspection results

use crate::element::InspectedElement;

/// Receives one snapshot per inspected click
///
/// Called synchronously from the host's message handler, in arrival order.
/// There is no way back into the sandbox from here.
pub trait InspectionSink {
    /// Handle one snapshot
    fn on_element_inspect(&mut self, element: InspectedElement);
}

impl<F> InspectionSink for F
where
    F: FnMut(InspectedElement),
{
    fn on_element_inspect(&mut self, element: InspectedElement) {
        self(element);
    }
}

impl InspectionSink for Vec<InspectedElement> {
    fn on_element_inspect(&mut self, element: InspectedElement) {
        self.push(element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ComputedStyles;

    fn sample() -> InspectedElement {
        InspectedElement::new("P", indexmap::IndexMap::new(), ComputedStyles::default(), "")
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = 0;
        {
            let mut sink = |_: InspectedElement| seen += 1;
            sink.on_element_inspect(sample());
            sink.on_element_inspect(sample());
        }
        assert_eq!(seen, 2);
    }

    #[test]
    fn vec_sink_appends_in_order() {
        let mut sink: Vec<InspectedElement> = Vec::new();
        sink.on_element_inspect(sample());
        assert_eq!(sink.len(), 1);
    }
}
