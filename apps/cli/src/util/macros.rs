//! Macros for handling CLI command output

/// Print output in the configured format (human or JSON)
#[macro_export]
macro_rules! print_output {
	($format:expr, $output:expr, $human:expr) => {{
		match $format {
			$crate::context::OutputFormat::Human => {
				$human($output);
			}
			$crate::context::OutputFormat::Json => {
				$crate::util::output::print_json($output)?;
			}
		}
	}};
}
