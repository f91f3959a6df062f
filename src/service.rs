//! Employee lookup and toggle operations.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::ServiceError;
use crate::hierarchy::{self, TreeStrategy};
use crate::repository::EmployeeRepository;
use crate::schema::EmployeeNode;

/// Composes the repository with the tree builder.
#[derive(Clone)]
pub struct EmployeeService {
    repository: Arc<dyn EmployeeRepository>,
    strategy: TreeStrategy,
}

impl EmployeeService {
    pub fn new(repository: Arc<dyn EmployeeRepository>, strategy: TreeStrategy) -> Self {
        Self {
            repository,
            strategy,
        }
    }

    /// Fetch an employee with all direct and indirect reports.
    ///
    /// The whole table is read once per call and the tree is rebuilt from scratch.
    pub async fn get_employee_by_id(&self, id: i64) -> Result<Option<EmployeeNode>, ServiceError> {
        let employees = self.repository.load_all_employees().await?;
        let tree = hierarchy::find_and_build_tree(&employees, id, self.strategy)?;

        match &tree {
            Some(root) => info!(
                "Employee {} found with {} nodes in subtree",
                id,
                hierarchy::count_nodes(root)
            ),
            None => info!("Employee {} not found", id),
        }

        Ok(tree)
    }

    /// Flip the enabled flag of an employee.
    ///
    /// `requested` is the value a caller asked for. It is accepted for wire
    /// compatibility but the operation always flips the current state.
    pub async fn enable_employee(&self, id: i64, requested: Option<&str>) -> Result<(), ServiceError> {
        if let Some(value) = requested {
            debug!("Ignoring requested enable={:?} for employee {}; flipping instead", value, id);
        }

        if !self.repository.toggle_enabled(id).await? {
            return Err(ServiceError::NotFound(id));
        }

        info!("Toggled enabled flag for employee {}", id);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::schema::EmployeeRecord;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Repository over a vector, for exercising the service without a database.
    #[derive(Default)]
    pub(crate) struct MemoryRepository {
        pub(crate) employees: Mutex<Vec<EmployeeRecord>>,
    }

    impl MemoryRepository {
        pub(crate) fn with(employees: Vec<EmployeeRecord>) -> Self {
            Self {
                employees: Mutex::new(employees),
            }
        }
    }

    #[async_trait]
    impl EmployeeRepository for MemoryRepository {
        async fn load_all_employees(&self) -> Result<Vec<EmployeeRecord>, ServiceError> {
            Ok(self.employees.lock().unwrap().clone())
        }

        async fn toggle_enabled(&self, id: i64) -> Result<bool, ServiceError> {
            let mut employees = self.employees.lock().unwrap();
            match employees.iter_mut().find(|e| e.id == id) {
                Some(employee) => {
                    employee.enabled = !employee.enabled;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    /// Repository whose store is always down.
    pub(crate) struct UnavailableRepository;

    #[async_trait]
    impl EmployeeRepository for UnavailableRepository {
        async fn load_all_employees(&self) -> Result<Vec<EmployeeRecord>, ServiceError> {
            Err(ServiceError::StorageUnavailable(sqlx::Error::PoolTimedOut))
        }

        async fn toggle_enabled(&self, _id: i64) -> Result<bool, ServiceError> {
            Err(ServiceError::StorageUnavailable(sqlx::Error::PoolTimedOut))
        }
    }

    pub(crate) fn sample_employees() -> Vec<EmployeeRecord> {
        vec![
            EmployeeRecord::new(1, "Alice", None),
            EmployeeRecord::new(2, "Bob", Some(1)),
            EmployeeRecord::new(3, "Carol", Some(1)),
            EmployeeRecord::new(4, "Dave", Some(2)),
        ]
    }

    fn service_over(repository: MemoryRepository) -> (EmployeeService, Arc<MemoryRepository>) {
        let repository = Arc::new(repository);
        let service = EmployeeService::new(repository.clone(), TreeStrategy::Indexed);
        (service, repository)
    }

    #[tokio::test]
    async fn test_get_employee_builds_tree() {
        let (service, _) = service_over(MemoryRepository::with(sample_employees()));
        let tree = service.get_employee_by_id(1).await.unwrap().unwrap();
        assert_eq!(tree.name, "Alice");
        assert_eq!(tree.reports.len(), 2);
        assert_eq!(hierarchy::count_nodes(&tree), 4);
    }

    #[tokio::test]
    async fn test_get_missing_employee_is_none() {
        let (service, _) = service_over(MemoryRepository::with(sample_employees()));
        assert!(service.get_employee_by_id(77).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_reports_cycle() {
        let (service, _) = service_over(MemoryRepository::with(vec![
            EmployeeRecord::new(1, "A", Some(2)),
            EmployeeRecord::new(2, "B", Some(1)),
        ]));
        let err = service.get_employee_by_id(1).await.unwrap_err();
        assert!(matches!(err, ServiceError::CyclicHierarchy { .. }));
    }

    #[tokio::test]
    async fn test_enable_flips_twice() {
        let mut record = EmployeeRecord::new(5, "Eve", None);
        record.enabled = false;
        let (service, repository) = service_over(MemoryRepository::with(vec![record]));

        service.enable_employee(5, Some("1")).await.unwrap();
        assert!(repository.load_all_employees().await.unwrap()[0].enabled);

        service.enable_employee(5, Some("1")).await.unwrap();
        assert!(!repository.load_all_employees().await.unwrap()[0].enabled);
    }

    #[tokio::test]
    async fn test_enable_missing_employee() {
        let (service, _) = service_over(MemoryRepository::default());
        let err = service.enable_employee(8, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(8)));
    }

    #[tokio::test]
    async fn test_storage_errors_propagate() {
        let service = EmployeeService::new(Arc::new(UnavailableRepository), TreeStrategy::Rescan);
        assert!(matches!(
            service.get_employee_by_id(1).await.unwrap_err(),
            ServiceError::StorageUnavailable(_)
        ));
        assert!(matches!(
            service.enable_employee(1, None).await.unwrap_err(),
            ServiceError::StorageUnavailable(_)
        ));
    }
}
