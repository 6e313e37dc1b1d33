//! Agent, task, and crew definitions handed to the execution engine.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named agent persona.
///
/// Purely declarative: the external engine decides how the role, goal, and
/// backstory are turned into prompts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentDefinition {
    /// Unique agent name, also the memory key for this agent.
    pub name: String,
    /// Short role description.
    pub role: String,
    /// What the agent is trying to achieve.
    #[serde(default)]
    pub goal: String,
    /// Persona background handed to the engine.
    #[serde(default)]
    pub backstory: String,
}

impl AgentDefinition {
    /// Create an agent with the given name and role.
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            goal: String::new(),
            backstory: String::new(),
        }
    }

    /// Set the agent's goal.
    pub fn goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }

    /// Set the agent's backstory.
    pub fn backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = backstory.into();
        self
    }
}

/// A unit of work assigned to one agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskDefinition {
    /// Unique task name.
    pub name: String,
    /// What the task asks for, with `{placeholder}` slots for run inputs.
    pub description: String,
    /// Expected shape of the task output.
    #[serde(default)]
    pub expected_output: String,
    /// Name of the agent executing this task.
    pub agent: String,
    /// Names of tasks that must complete first.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl TaskDefinition {
    /// Create a task assigned to the named agent.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        agent: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            expected_output: String::new(),
            agent: agent.into(),
            depends_on: Vec::new(),
        }
    }

    /// Set the expected output description.
    pub fn expected_output(mut self, expected_output: impl Into<String>) -> Self {
        self.expected_output = expected_output.into();
        self
    }

    /// Add a dependency on an earlier task.
    pub fn depends_on(mut self, task: impl Into<String>) -> Self {
        self.depends_on.push(task.into());
        self
    }
}

/// Execution mode requested from the engine.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    /// Tasks run one after another in list order.
    #[default]
    Sequential,
}

/// A crew: agents plus tasks with dependency edges.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewDefinition {
    /// Crew name, used as the memory key for crew-level records.
    pub name: String,
    /// Agents available to the crew.
    pub agents: Vec<AgentDefinition>,
    /// Tasks in execution order.
    pub tasks: Vec<TaskDefinition>,
    /// Execution mode.
    #[serde(default)]
    pub process: Process,
}

impl CrewDefinition {
    /// Create an empty sequential crew.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agents: Vec::new(),
            tasks: Vec::new(),
            process: Process::Sequential,
        }
    }

    /// Add an agent.
    pub fn agent(mut self, agent: AgentDefinition) -> Self {
        self.agents.push(agent);
        self
    }

    /// Add a task.
    pub fn task(mut self, task: TaskDefinition) -> Self {
        self.tasks.push(task);
        self
    }

    /// Check that names are unique, every task's agent exists, and every
    /// dependency names an earlier task (which also rules out cycles).
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut agent_names = HashSet::new();
        for agent in &self.agents {
            if !agent_names.insert(agent.name.as_str()) {
                return Err(CoreError::DuplicateName(agent.name.clone()));
            }
        }

        let mut earlier_tasks: HashSet<&str> = HashSet::new();
        for task in &self.tasks {
            if earlier_tasks.contains(task.name.as_str()) {
                return Err(CoreError::DuplicateName(task.name.clone()));
            }
            if !agent_names.contains(task.agent.as_str()) {
                return Err(CoreError::UnknownAgent {
                    task: task.name.clone(),
                    agent: task.agent.clone(),
                });
            }
            for dependency in &task.depends_on {
                if !earlier_tasks.contains(dependency.as_str()) {
                    return Err(CoreError::UnresolvedDependency {
                        task: task.name.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
            earlier_tasks.insert(task.name.as_str());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AgentDefinition, CrewDefinition, TaskDefinition};
    use crate::error::CoreError;

    fn research_crew() -> CrewDefinition {
        CrewDefinition::new("research_crew")
            .agent(AgentDefinition::new("researcher", "Senior researcher"))
            .agent(AgentDefinition::new("summarizer", "Summarizer"))
            .task(TaskDefinition::new(
                "research",
                "Research {topic}",
                "researcher",
            ))
            .task(
                TaskDefinition::new("summarize", "Summarize the findings", "summarizer")
                    .depends_on("research"),
            )
    }

    #[test]
    fn valid_crew_passes_validation() {
        research_crew().validate().expect("valid crew");
    }

    #[test]
    fn unknown_agent_is_rejected() {
        let crew = research_crew().task(TaskDefinition::new("extra", "Do more", "ghost"));
        assert!(matches!(
            crew.validate(),
            Err(CoreError::UnknownAgent { agent, .. }) if agent == "ghost"
        ));
    }

    #[test]
    fn forward_dependency_is_rejected() {
        let crew = CrewDefinition::new("crew")
            .agent(AgentDefinition::new("a", "Agent"))
            .task(TaskDefinition::new("first", "First", "a").depends_on("second"))
            .task(TaskDefinition::new("second", "Second", "a"));
        assert!(matches!(
            crew.validate(),
            Err(CoreError::UnresolvedDependency { dependency, .. }) if dependency == "second"
        ));
    }

    #[test]
    fn self_dependency_is_rejected() {
        let crew = CrewDefinition::new("crew")
            .agent(AgentDefinition::new("a", "Agent"))
            .task(TaskDefinition::new("loop", "Loop", "a").depends_on("loop"));
        assert!(crew.validate().is_err());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let crew = research_crew().agent(AgentDefinition::new("researcher", "Duplicate"));
        assert!(matches!(
            crew.validate(),
            Err(CoreError::DuplicateName(name)) if name == "researcher"
        ));
    }
}
