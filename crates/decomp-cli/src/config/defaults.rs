/// Built-in values used when neither the config file nor the command line
/// provides one.
pub struct DefaultsConfig {
    pub snapshot_directory: String,
    pub snapshot_prefix: String,
    pub snapshot_suffix: String,
    pub convert_program: String,
    pub convert_args: Vec<String>,
    pub extract_chain_program: String,
    pub extract_chain_args: Vec<String>,
    pub select_chain: bool,
    pub chain_id: String,
    pub parameterize_program: String,
    pub parameterize_args: Vec<String>,
    pub solver_program: String,
    pub solver_args: Vec<String>,
    pub solver_template: String,
    pub solver_placeholder: String,
    pub output_directory: String,
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            snapshot_directory: ".".to_string(),
            snapshot_prefix: "frame".to_string(),
            snapshot_suffix: ".gro".to_string(),
            convert_program: "gmx".to_string(),
            convert_args: args(&["editconf", "-f", "{input}", "-o", "{output}"]),
            extract_chain_program: "pdb_selchain".to_string(),
            extract_chain_args: args(&["-{chain}", "{input}"]),
            select_chain: true,
            chain_id: "A".to_string(),
            parameterize_program: "pdb2pqr".to_string(),
            parameterize_args: args(&["--ff=AMBER", "{input}", "{output}"]),
            solver_program: "apbs".to_string(),
            solver_args: args(&["{input}"]),
            solver_template: "apbs.in".to_string(),
            solver_placeholder: "{structure}".to_string(),
            output_directory: ".".to_string(),
        }
    }
}
