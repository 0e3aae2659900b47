use clap::Args;

#[derive(Args, Debug)]
pub struct FieldsArgs {
	/// Category name, case insensitive
	pub category: String,
}
